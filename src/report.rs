//! The sales report pipeline: layout, logo loading and PDF rendering.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use thiserror::Error;

use crate::builder::DocumentBuilder;
use crate::config::ReportSettings;
use crate::elements::{load_logo, PageCanvas};
use crate::layout::{lay_out, LayoutError, ReportHeader, REPORT_TITLE};
use crate::model::SaleRecord;
use crate::store::FetchError;

/// Name offered to the browser for the downloaded report.
pub const REPORT_FILENAME: &str = "Reporte_Ventas_TechNorth.pdf";

/// Errors that abort a report request.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("report worker stopped unexpectedly: {0}")]
    Worker(String),
}

impl ReportError {
    fn render(error: &genpdf::error::Error) -> Self {
        Self::Render(describe(error))
    }
}

/// Joins an error with all of its sources, outermost first.
pub fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A finished report held in memory.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub grand_total: f64,
    pub row_count: usize,
}

/// Renders `records`, in the order given, into a complete PDF.
///
/// `generated_at` is printed under the title. Nothing is returned unless the whole
/// document rendered successfully.
pub fn render_sales_report(
    records: &[SaleRecord],
    settings: &ReportSettings,
    generated_at: DateTime<Utc>,
) -> Result<RenderedReport, ReportError> {
    let logo = load_logo(&settings.logo_path).map_err(|err| ReportError::render(&err))?;
    if logo.is_none() {
        warn!(
            "logo not found at {}, printing the company name instead",
            settings.logo_path.display()
        );
    }

    let header = ReportHeader {
        company: &settings.company,
        logo_available: logo.is_some(),
        generated_at,
        utc_offset: settings.utc_offset,
    };
    let layout = lay_out(records, &header)?;
    let page_count = layout.page_count();

    let bytes = DocumentBuilder::new()
        .with_title(REPORT_TITLE)
        .with_font_directory(settings.font_directory.clone())
        .push(PageCanvas::new(layout.pages, logo))
        .render()
        .map_err(|err| ReportError::render(&err))?;

    debug!(
        "rendered {} sales on {} page(s), {} bytes",
        layout.row_count,
        page_count,
        bytes.len()
    );
    Ok(RenderedReport {
        bytes,
        page_count,
        grand_total: layout.grand_total,
        row_count: layout.row_count,
    })
}

#[cfg(test)]
mod tests {
    use super::{describe, render_sales_report, ReportError};
    use crate::config::ReportSettings;
    use crate::model::SaleRecord;
    use chrono::Utc;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("font family not found")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("no such file")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    #[test]
    fn describe_includes_every_cause() {
        assert_eq!(describe(&Outer(Inner)), "font family not found: no such file");
    }

    #[test]
    fn non_finite_amount_fails_before_rendering() {
        let settings = ReportSettings::default().with_logo_path("/no/logo/here.jpeg");
        let records = vec![SaleRecord::new().with_amounts(1.0, f64::INFINITY)];
        let err = render_sales_report(&records, &settings, Utc::now()).unwrap_err();
        assert!(matches!(err, ReportError::Layout(_)));
    }

    #[test]
    fn undecodable_logo_is_a_render_error() {
        let path = std::env::temp_dir().join(format!(
            "sales_report_pipeline_logo_{}.jpeg",
            std::process::id()
        ));
        std::fs::write(&path, b"garbage").unwrap();
        let settings = ReportSettings::default().with_logo_path(&path);
        let err = render_sales_report(&[], &settings, Utc::now()).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, ReportError::Render(_)));
    }
}
