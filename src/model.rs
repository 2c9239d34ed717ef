//! Data structures describing the sales data and the fixed content of a report.
//!
//! The types in this module avoid referencing the rendering crate directly so the
//! values can be produced by the store clients, fixtures and the layout engine
//! without pulling in `genpdf`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder printed when a sale has no timestamp or no seller.
pub const MISSING_VALUE: &str = "N/A";

/// One sale as stored in the `sales` collection.
///
/// Every field is optional in the store. Missing amounts count as zero, missing
/// timestamps and sellers are printed as [`MISSING_VALUE`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub employee_email: Option<String>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl SaleRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timestamp and returns the updated record.
    pub fn with_timestamp(mut self, timestamp: impl Into<Option<DateTime<Utc>>>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Sets the seller email and returns the updated record.
    pub fn with_employee_email(mut self, email: impl Into<String>) -> Self {
        self.employee_email = Some(email.into());
        self
    }

    /// Sets both amounts and returns the updated record.
    pub fn with_amounts(mut self, subtotal: f64, total: f64) -> Self {
        self.subtotal = Some(subtotal);
        self.total = Some(total);
        self
    }

    /// Returns the seller as displayed in the report: the part of the email before `@`.
    ///
    /// An absent or empty email yields `None`.
    pub fn seller(&self) -> Option<&str> {
        let email = self.employee_email.as_deref().filter(|email| !email.is_empty())?;
        Some(email.split('@').next().unwrap_or(email))
    }

    /// Returns the subtotal, defaulting to zero.
    pub fn subtotal_or_zero(&self) -> f64 {
        self.subtotal.unwrap_or(0.0)
    }

    /// Returns the total, defaulting to zero.
    pub fn total_or_zero(&self) -> f64 {
        self.total.unwrap_or(0.0)
    }
}

/// Identification lines printed in the report header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Short name drawn in place of the logo when no logo file is available.
    pub display_name: String,
    pub legal_name: String,
    pub tax_id: String,
    pub address: String,
    pub contact_email: String,
}

impl CompanyProfile {
    /// Returns the right-aligned identification lines in print order.
    pub fn identification_lines(&self) -> [&str; 4] {
        [
            self.legal_name.as_str(),
            self.tax_id.as_str(),
            self.address.as_str(),
            self.contact_email.as_str(),
        ]
    }
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            display_name: "TechNorth".to_owned(),
            legal_name: "TechNorth S.A. de C.V.".to_owned(),
            tax_id: "TNO211101A01".to_owned(),
            address: "Av. Innovación 123, Apodaca, N.L.".to_owned(),
            contact_email: "soporte@technorth.mx".to_owned(),
        }
    }
}

/// Horizontal alignment of text inside its box.
///
/// [`crate::elements::PageCanvas`] resolves it against the measured text width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
}

/// An sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const HEADER_FILL: Rgb = Rgb(0xF0, 0xF0, 0xF0);
    pub const ACCENT: Rgb = Rgb(0x0D, 0x47, 0xA1);
}

#[cfg(test)]
mod tests {
    use super::SaleRecord;

    #[test]
    fn seller_is_local_part_of_email() {
        let record = SaleRecord::new().with_employee_email("ana.lopez@technorth.mx");
        assert_eq!(record.seller(), Some("ana.lopez"));
    }

    #[test]
    fn seller_without_domain_is_kept_whole() {
        let record = SaleRecord::new().with_employee_email("mostrador");
        assert_eq!(record.seller(), Some("mostrador"));
    }

    #[test]
    fn empty_email_counts_as_missing() {
        assert_eq!(SaleRecord::new().with_employee_email("").seller(), None);
        assert_eq!(SaleRecord::new().seller(), None);
    }

    #[test]
    fn missing_amounts_default_to_zero() {
        let record = SaleRecord::new();
        assert_eq!(record.subtotal_or_zero(), 0.0);
        assert_eq!(record.total_or_zero(), 0.0);
    }

    #[test]
    fn deserializes_partial_json() {
        let record: SaleRecord =
            serde_json::from_str(r#"{"employee_email":"luis@technorth.mx","total":10.5}"#)
                .unwrap();
        assert_eq!(record.timestamp, None);
        assert_eq!(record.subtotal, None);
        assert_eq!(record.total, Some(10.5));
    }
}
