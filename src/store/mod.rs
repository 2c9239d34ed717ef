//! Sales data sources.
//!
//! The report only needs one query: every sale, newest first. [`SalesSource`] is the seam
//! between the HTTP layer and whatever holds the data; [`FirestoreSalesSource`] talks to
//! Cloud Firestore and [`InMemorySalesSource`] serves fixed records.

pub mod credentials;
pub mod firestore;

use std::cmp::Reverse;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::SaleRecord;

pub use credentials::{CredentialError, ServiceAccountKey};
pub use firestore::FirestoreSalesSource;

/// Errors raised while fetching sales.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not obtain an access token: {0}")]
    Auth(String),

    #[error("request to the document store failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("document store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("document {document} is malformed: {reason}")]
    Decode { document: String, reason: String },
}

/// Anything that can list all sales ordered by timestamp, newest first.
///
/// An empty vector is a valid answer and produces the "no sales" report.
#[async_trait]
pub trait SalesSource: Send + Sync {
    async fn fetch_sales(&self) -> Result<Vec<SaleRecord>, FetchError>;
}

/// Serves a fixed set of records, sorted newest first with undated sales last.
#[derive(Clone, Debug, Default)]
pub struct InMemorySalesSource {
    records: Vec<SaleRecord>,
}

impl InMemorySalesSource {
    pub fn new(records: impl Into<Vec<SaleRecord>>) -> Self {
        let mut records = records.into();
        // stable: equal timestamps keep insertion order
        records.sort_by_key(|record| (record.timestamp.is_none(), Reverse(record.timestamp)));
        Self { records }
    }
}

#[async_trait]
impl SalesSource for InMemorySalesSource {
    async fn fetch_sales(&self) -> Result<Vec<SaleRecord>, FetchError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemorySalesSource, SalesSource};
    use crate::model::SaleRecord;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn in_memory_source_orders_newest_first() {
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let source = InMemorySalesSource::new(vec![
            SaleRecord::new().with_employee_email("undated"),
            SaleRecord::new().with_timestamp(older).with_employee_email("older"),
            SaleRecord::new().with_timestamp(newer).with_employee_email("newer"),
        ]);

        let sellers: Vec<String> = source
            .fetch_sales()
            .await
            .unwrap()
            .iter()
            .map(|record| record.seller().unwrap().to_owned())
            .collect();
        assert_eq!(sellers, vec!["newer", "older", "undated"]);
    }

    #[tokio::test]
    async fn empty_source_is_not_an_error() {
        let source = InMemorySalesSource::default();
        assert!(source.fetch_sales().await.unwrap().is_empty());
    }
}
