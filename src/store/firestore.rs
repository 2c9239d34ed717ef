//! Cloud Firestore client for the `sales` collection, using the REST API.
//!
//! Only `documents:runQuery` is used, with a structured query ordering the collection by
//! `timestamp` descending. Documents come back as typed value maps
//! (`{"stringValue": ...}`, `{"integerValue": "12"}`, ...) and are decoded into
//! [`SaleRecord`]s here.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use crate::model::SaleRecord;

use super::credentials::{CredentialError, ServiceAccountKey, TokenSigner};
use super::{FetchError, SalesSource};

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";
/// Token the Firestore emulator accepts in place of a real access token.
const EMULATOR_TOKEN: &str = "owner";
/// Access tokens are refreshed this long before they expire.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

pub const DEFAULT_COLLECTION: &str = "sales";
pub const ORDER_FIELD: &str = "timestamp";

#[derive(Clone, Debug)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

enum Authenticator {
    ServiceAccount {
        signer: TokenSigner,
        cached: Mutex<Option<AccessToken>>,
    },
    Emulator,
}

/// Reads sales from a Firestore collection.
pub struct FirestoreSalesSource {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    auth: Authenticator,
}

impl FirestoreSalesSource {
    /// Connects with a service-account key. Fails if the key cannot sign assertions.
    pub fn new(key: ServiceAccountKey, collection: impl Into<String>) -> Result<Self, CredentialError> {
        let project_id = key.project_id.clone();
        let signer = TokenSigner::new(key)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: FIRESTORE_API.to_owned(),
            project_id,
            collection: collection.into(),
            auth: Authenticator::ServiceAccount {
                signer,
                cached: Mutex::new(None),
            },
        })
    }

    /// Targets a Firestore emulator listening on `host` (e.g. `localhost:8080`).
    pub fn emulator(
        host: &str,
        project_id: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("http://{}/v1", host.trim_end_matches('/')),
            project_id: project_id.into(),
            collection: collection.into(),
            auth: Authenticator::Emulator,
        }
    }

    fn run_query_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents:runQuery",
            self.base_url, self.project_id
        )
    }

    async fn access_token(&self) -> Result<String, FetchError> {
        let (signer, cached) = match &self.auth {
            Authenticator::Emulator => return Ok(EMULATOR_TOKEN.to_owned()),
            Authenticator::ServiceAccount { signer, cached } => (signer, cached),
        };

        let mut cached = cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = signer
            .assertion(now)
            .map_err(|err| FetchError::Auth(err.to_string()))?;
        let response = self
            .http
            .post(&signer.key().token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Auth(format!("token endpoint answered {status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        debug!("obtained access token valid for {}s", token.expires_in);
        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }
}

/// Structured query listing the whole collection, newest first.
pub fn sales_query(collection: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": ORDER_FIELD },
                "direction": "DESCENDING"
            }]
        }
    })
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Decodes a `runQuery` response body into records, keeping the server's order.
pub fn decode_run_query(body: &str) -> Result<Vec<SaleRecord>, FetchError> {
    let items: Vec<RunQueryItem> = serde_json::from_str(body).map_err(|err| FetchError::Decode {
        document: "<runQuery response>".to_owned(),
        reason: err.to_string(),
    })?;

    items
        .into_iter()
        .filter_map(|item| item.document)
        .map(|document| decode_document(&document))
        .collect()
}

fn decode_document(document: &Document) -> Result<SaleRecord, FetchError> {
    let malformed = |reason: String| FetchError::Decode {
        document: document.name.clone(),
        reason,
    };
    let field = |name: &str| typed_value(&document.fields, name).map_err(&malformed);

    let timestamp = match field("timestamp")? {
        None => None,
        Some(("timestampValue", Value::String(raw))) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|err| malformed(format!("timestamp '{raw}': {err}")))?
                .with_timezone(&Utc),
        ),
        Some((kind, _)) => return Err(malformed(format!("timestamp has type {kind}"))),
    };

    let employee_email = match field("employee_email")? {
        None => None,
        Some(("stringValue", Value::String(email))) => Some(email.clone()),
        Some((kind, _)) => return Err(malformed(format!("employee_email has type {kind}"))),
    };

    let subtotal = amount(field("subtotal")?, "subtotal").map_err(&malformed)?;
    let total = amount(field("total")?, "total").map_err(&malformed)?;

    Ok(SaleRecord {
        timestamp,
        employee_email,
        subtotal,
        total,
    })
}

/// Returns the `(type, value)` pair of a field, or `None` when absent or null.
fn typed_value<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
) -> Result<Option<(&'a str, &'a Value)>, String> {
    let Some(value) = fields.get(name) else {
        return Ok(None);
    };
    let object = value
        .as_object()
        .filter(|object| object.len() == 1)
        .ok_or_else(|| format!("{name} is not a typed value"))?;
    match object.iter().next() {
        Some((kind, _)) if kind == "nullValue" => Ok(None),
        Some((kind, inner)) => Ok(Some((kind.as_str(), inner))),
        None => Err(format!("{name} is empty")),
    }
}

fn amount(value: Option<(&str, &Value)>, name: &str) -> Result<Option<f64>, String> {
    match value {
        None => Ok(None),
        Some(("integerValue", Value::String(raw))) => raw
            .parse::<i64>()
            .map(|integer| Some(integer as f64))
            .map_err(|err| format!("{name} '{raw}': {err}")),
        Some(("integerValue", Value::Number(number))) | Some(("doubleValue", Value::Number(number))) => {
            number
                .as_f64()
                .map(Some)
                .ok_or_else(|| format!("{name} {number} is out of range"))
        }
        Some(("doubleValue", Value::String(raw))) => raw
            .parse::<f64>()
            .map(Some)
            .map_err(|err| format!("{name} '{raw}': {err}")),
        Some((kind, _)) => Err(format!("{name} has type {kind}")),
    }
}

#[async_trait]
impl SalesSource for FirestoreSalesSource {
    async fn fetch_sales(&self) -> Result<Vec<SaleRecord>, FetchError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(self.run_query_url())
            .bearer_auth(token)
            .json(&sales_query(&self.collection))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let records = decode_run_query(&body)?;
        debug!(
            "fetched {} sales from collection '{}'",
            records.len(),
            self.collection
        );
        Ok(records)
    }
}
