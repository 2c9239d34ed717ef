//! Document construction helpers for the report renderer.

use std::path::PathBuf;

use genpdf::elements::LinearLayout;
use genpdf::error::Error;
use genpdf::{Element, PaperSize};

use crate::fonts;

/// Builder for A4 `genpdf::Document` instances laid out in absolute coordinates.
///
/// No page decorator is installed: elements receive the whole page as their area, so
/// coordinates measured from the top-left page corner can be used as-is.
pub struct DocumentBuilder {
    title: Option<String>,
    font_directory: Option<PathBuf>,
    body: LinearLayout,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            title: None,
            font_directory: None,
            body: LinearLayout::vertical(),
        }
    }
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Searches this directory for the font family before the default locations.
    pub fn with_font_directory(mut self, directory: impl Into<Option<PathBuf>>) -> Self {
        self.font_directory = directory.into();
        self
    }

    /// Appends an element to the document body.
    pub fn push<E: Element + 'static>(mut self, element: E) -> Self {
        self.body.push(element);
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::report_font_family(self.font_directory.as_deref())?;
        let mut document = genpdf::Document::new(font_family);

        document.set_paper_size(PaperSize::A4);
        if let Some(title) = self.title {
            document.set_title(title);
        }
        document.push(self.body);

        Ok(document)
    }

    /// Builds the document and renders it into memory.
    pub fn render(self) -> Result<Vec<u8>, Error> {
        let document = self.build()?;
        let mut bytes = Vec::new();
        document.render(&mut bytes)?;
        Ok(bytes)
    }
}
