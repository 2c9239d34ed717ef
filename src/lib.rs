//! Core entry point for the sales_report crate.
//!
//! The crate turns the sales stored in Firestore into a paginated PDF report and serves
//! it over HTTP. [`layout`] decides what goes where, [`elements`] draws it with
//! `genpdf`, [`report`] ties both together and [`http`] delivers the bytes.

pub mod builder;
pub mod config;
pub mod elements;
pub mod fonts;
pub mod http;
pub mod layout;
pub mod locale;
pub mod model;
pub mod money;
pub mod report;
pub mod store;

pub use config::ReportSettings;
pub use model::{CompanyProfile, SaleRecord};
pub use report::{render_sales_report, RenderedReport, ReportError};
