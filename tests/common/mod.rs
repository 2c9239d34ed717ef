use std::sync::Once;

use sales_report::fonts;

static SKIP_BANNER: Once = Once::new();

/// Reports whether a report font family is installed. When it is not, the test is
/// named on stderr and the search summary is printed once per test binary.
pub fn fonts_ready(test: &str) -> bool {
    if fonts::report_fonts_available(None) {
        return true;
    }
    SKIP_BANNER.call_once(|| {
        let searched = fonts::locate_font_family(None)
            .err()
            .map(|err| err.to_string())
            .unwrap_or_default();
        eprintln!();
        eprintln!("==================== PDF RENDERING TESTS SKIPPED ====================");
        eprintln!("No LiberationSans, Roboto, DejaVu Sans or Arial family was found.");
        eprintln!("Install one of them or set {} to a directory", fonts::FONTS_DIR_ENV);
        eprintln!("holding a complete family to run these tests.");
        eprintln!("{searched}");
        eprintln!("=====================================================================");
    });
    eprintln!("SKIPPED {test}: no report font family");
    false
}
