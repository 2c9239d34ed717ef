//! HTTP delivery of the sales report.
//!
//! `GET /report/sales` fetches every sale, renders the PDF in memory on the blocking
//! pool and only then answers, so any failure becomes a plain-text 500.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use log::{error, info};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ReportSettings;
use crate::report::{render_sales_report, ReportError, REPORT_FILENAME};
use crate::store::SalesSource;

pub const REPORT_ROUTE: &str = "/report/sales";
/// Prefix of every failure body.
pub const ERROR_PREFIX: &str = "Error al generar el reporte: ";

/// Shared state of the report service.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SalesSource>,
    pub settings: Arc<ReportSettings>,
}

impl AppState {
    pub fn new(source: Arc<dyn SalesSource>, settings: ReportSettings) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the service router with permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(REPORT_ROUTE, get(sales_report))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn sales_report(State(state): State<AppState>) -> Result<Response, ReportError> {
    let records = state.source.fetch_sales().await?;

    let settings = Arc::clone(&state.settings);
    let report = tokio::task::spawn_blocking(move || {
        render_sales_report(&records, &settings, Utc::now())
    })
    .await
    .map_err(|err| ReportError::Worker(err.to_string()))??;

    info!(
        "sales report ready: {} rows, {} page(s)",
        report.row_count, report.page_count
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        report.bytes,
    )
        .into_response())
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!("sales report failed: {message}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{ERROR_PREFIX}{message}"),
        )
            .into_response()
    }
}
