//! Font loading utilities for the report renderer.
//!
//! `genpdf` embeds TrueType fonts and needs their metrics to measure right-aligned and
//! centered text, so a complete family (regular, bold, italic, bold italic) has to be
//! found on disk before a document can be built.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Environment variable pointing at a directory with a usable font family.
pub const FONTS_DIR_ENV: &str = "REPORT_FONTS_DIR";

/// Family names tried in every candidate directory, in order of preference.
///
/// Liberation Sans is metric compatible with Helvetica, the face the report was designed
/// for.
pub const FONT_FAMILY_NAMES: &[&str] = &["LiberationSans", "Roboto"];

const FACE_SUFFIXES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/TTF",
];

/// A family whose faces follow their own file naming and are loaded one by one.
struct FallbackFamily {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FallbackFamily {
    fn faces(&self) -> [(&'static str, &'static str); 4] {
        [
            (self.regular, "regular"),
            (self.bold, "bold"),
            (self.italic, "italic"),
            (self.bold_italic, "bold italic"),
        ]
    }

    fn is_complete_in(&self, directory: &Path) -> bool {
        self.faces()
            .iter()
            .all(|(file, _)| directory.join(file).is_file())
    }
}

const FALLBACK_FAMILIES: &[FallbackFamily] = &[
    FallbackFamily {
        name: "DejaVu Sans",
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
    FallbackFamily {
        name: "Arial",
        regular: "arial.ttf",
        bold: "arialbd.ttf",
        italic: "ariali.ttf",
        bold_italic: "arialbi.ttf",
    },
];

const FALLBACK_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/dejavu-sans-fonts",
    "/usr/share/fonts/TTF",
];

/// A font family located on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontLocation {
    pub directory: PathBuf,
    pub family: &'static str,
}

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn font_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = explicit {
        push_unique(&mut candidates, path.to_path_buf());
    }

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push_unique(&mut candidates, path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push_unique(&mut candidates, bin_dir.join("assets/fonts"));
        }
    }

    push_unique(
        &mut candidates,
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts"),
    );

    for directory in SYSTEM_FONT_DIRECTORIES {
        push_unique(&mut candidates, PathBuf::from(directory));
    }

    candidates
}

fn missing_faces(directory: &Path, family: &str) -> Vec<String> {
    FACE_SUFFIXES
        .iter()
        .map(|suffix| format!("{family}-{suffix}.ttf"))
        .filter(|name| !directory.join(name).is_file())
        .collect()
}

/// Finds the first directory holding a complete supported family.
pub fn locate_font_family(explicit: Option<&Path>) -> Result<FontLocation, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(explicit) {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        for &family in FONT_FAMILY_NAMES {
            let missing = missing_faces(&candidate, family);
            if missing.is_empty() {
                return Ok(FontLocation {
                    directory: candidate,
                    family,
                });
            }
            attempts.push(format!(
                "{} (missing {})",
                candidate.display(),
                missing.join(", ")
            ));
        }
    }

    Err(Error::new(
        format!(
            "Unable to locate a report font family. Checked: {}. Set {} to a directory with {}.",
            attempts.join(", "),
            FONTS_DIR_ENV,
            FONT_FAMILY_NAMES.join(" or ")
        ),
        io::Error::new(io::ErrorKind::NotFound, "report fonts not found"),
    ))
}

fn load_located_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let location = locate_font_family(explicit)?;
    debug!(
        "loading font family '{}' from {}",
        location.family,
        location.directory.display()
    );

    fonts::from_files(&location.directory, location.family, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                location.family,
                location.directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn windows_font_directory() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn fallback_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = font_directory_candidates(explicit);
    for directory in FALLBACK_FONT_DIRECTORIES {
        push_unique(&mut candidates, PathBuf::from(directory));
    }
    if let Some(directory) = windows_font_directory() {
        push_unique(&mut candidates, directory);
    }
    candidates
}

/// Finds the first directory holding every face of a fallback family.
fn locate_fallback_family(
    explicit: Option<&Path>,
) -> Option<(PathBuf, &'static FallbackFamily)> {
    fallback_directory_candidates(explicit)
        .into_iter()
        .find_map(|directory| {
            FALLBACK_FAMILIES
                .iter()
                .find(|family| family.is_complete_in(&directory))
                .map(|family| (directory, family))
        })
}

fn load_fallback_font(
    directory: &Path,
    family: &FallbackFamily,
    file: &str,
    style: &str,
) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load fallback '{}' {} font at {}: {}",
                family.name,
                style,
                path.display(),
                err
            ),
            io::Error::new(io::ErrorKind::NotFound, err.to_string()),
        )
    })
}

fn fallback_font_family(
    explicit: Option<&Path>,
) -> Result<(&'static str, FontFamily<FontData>), Error> {
    let (directory, family) = locate_fallback_family(explicit).ok_or_else(|| {
        Error::new(
            "No fallback font family found",
            io::Error::new(io::ErrorKind::NotFound, "fallback fonts not found"),
        )
    })?;
    debug!(
        "loading fallback font family '{}' from {}",
        family.name,
        directory.display()
    );

    let [regular, bold, italic, bold_italic] = family.faces();
    Ok((
        family.name,
        FontFamily {
            regular: load_fallback_font(&directory, family, regular.0, regular.1)?,
            bold: load_fallback_font(&directory, family, bold.0, bold.1)?,
            italic: load_fallback_font(&directory, family, italic.0, italic.1)?,
            bold_italic: load_fallback_font(&directory, family, bold_italic.0, bold_italic.1)?,
        },
    ))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Returns the report font family, searching `explicit` first and falling back to
/// DejaVu Sans or the Windows Arial family when no preferred family is installed.
pub fn report_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    match load_located_family(explicit) {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match fallback_font_family(explicit) {
            Ok((name, fallback)) => {
                warn!(
                    "Report fonts unavailable ({}); falling back to the '{}' family.",
                    err, name
                );
                Ok(fallback)
            }
            Err(_) => Err(err),
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether a complete font family can be found without loading it.
pub fn report_fonts_available(explicit: Option<&Path>) -> bool {
    locate_font_family(explicit).is_ok() || locate_fallback_family(explicit).is_some()
}

#[cfg(test)]
mod tests {
    use super::{
        font_directory_candidates, locate_fallback_family, locate_font_family, missing_faces,
    };
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sales_report_fonts_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn explicit_directory_is_searched_first() {
        let explicit = PathBuf::from("/opt/report-fonts");
        let candidates = font_directory_candidates(Some(&explicit));
        assert_eq!(candidates.first(), Some(&explicit));
    }

    #[test]
    fn reports_every_missing_face() {
        let dir = scratch_dir("partial");
        fs::write(dir.join("Roboto-Regular.ttf"), b"").unwrap();
        let missing = missing_faces(&dir, "Roboto");
        assert_eq!(
            missing,
            vec![
                "Roboto-Bold.ttf".to_owned(),
                "Roboto-Italic.ttf".to_owned(),
                "Roboto-BoldItalic.ttf".to_owned(),
            ]
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn complete_family_in_explicit_directory_is_located() {
        let dir = scratch_dir("complete");
        for face in ["Regular", "Bold", "Italic", "BoldItalic"] {
            fs::write(dir.join(format!("LiberationSans-{face}.ttf")), b"").unwrap();
        }
        let location = locate_font_family(Some(&dir)).unwrap();
        assert_eq!(location.directory, dir);
        assert_eq!(location.family, "LiberationSans");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn dejavu_sans_is_accepted_as_fallback_family() {
        let dir = scratch_dir("dejavu");
        for file in [
            "DejaVuSans.ttf",
            "DejaVuSans-Bold.ttf",
            "DejaVuSans-Oblique.ttf",
            "DejaVuSans-BoldOblique.ttf",
        ] {
            fs::write(dir.join(file), b"").unwrap();
        }
        assert!(locate_font_family(Some(&dir)).map_or(true, |location| location.directory != dir));

        let (directory, family) = locate_fallback_family(Some(&dir)).unwrap();
        assert_eq!(directory, dir);
        assert_eq!(family.name, "DejaVu Sans");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn incomplete_fallback_family_is_skipped() {
        let dir = scratch_dir("dejavu_partial");
        fs::write(dir.join("DejaVuSans.ttf"), b"").unwrap();
        let located = locate_fallback_family(Some(&dir));
        assert!(located.map_or(true, |(directory, _)| directory != dir));
        let _ = fs::remove_dir_all(&dir);
    }
}
