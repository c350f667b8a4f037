//! HTTP front end: upload three feeds, download the rendered workbook.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use trimatch_core::{RawRecord, ReconConfig};
use trimatch_engine::reconcile;
use trimatch_ingest::IngestError;
use trimatch_report::{build_workbook, ReportError};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    config: Arc<ReconConfig>,
}

enum ApiError {
    BadUpload(String),
    MissingPart(&'static str),
    Ingest(IngestError),
    Report(ReportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadUpload(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::MissingPart(part) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("missing multipart field: {part}"),
            ),
            ApiError::Ingest(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Report(e) => {
                tracing::error!(error = %e, "report rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to render report".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Keeps client names safe for Content-Disposition filenames.
fn slug(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if cleaned.chars().all(|c| c == '_') {
        "client".to_string()
    } else {
        cleaned
    }
}

/// POST /reconcile: multipart form with `client_name` plus `bank`,
/// `ledger` and `gateway` file parts. Responds with the workbook as an
/// attachment. Bad feeds come back as 422 with the ingest message.
async fn reconcile_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut client = "client".to_string();
    let mut bank: Option<Vec<RawRecord>> = None;
    let mut ledger: Option<Vec<RawRecord>> = None;
    let mut gateway: Option<Vec<RawRecord>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "client_name" => {
                client = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadUpload(e.to_string()))?;
            }
            "bank" | "ledger" | "gateway" => {
                let filename = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadUpload(e.to_string()))?;
                let records = trimatch_ingest::load_feed_bytes(&filename, &bytes)
                    .map_err(ApiError::Ingest)?;
                tracing::info!(feed = %name, file = %filename, rows = records.len(), "feed uploaded");
                match name.as_str() {
                    "bank" => bank = Some(records),
                    "ledger" => ledger = Some(records),
                    _ => gateway = Some(records),
                }
            }
            _ => {}
        }
    }

    let bank = bank.ok_or(ApiError::MissingPart("bank"))?;
    let ledger = ledger.ok_or(ApiError::MissingPart("ledger"))?;
    let gateway = gateway.ok_or(ApiError::MissingPart("gateway"))?;

    let output = reconcile(&bank, &ledger, &gateway, &state.config);
    tracing::info!(
        client = %client,
        total = output.summary.total,
        match_rate_pct = output.summary.match_rate_pct,
        "reconciliation complete"
    );

    let bytes = build_workbook(&client, &output).map_err(ApiError::Report)?;
    let filename = format!("{}_reconciliation.xlsx", slug(&client));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn app(config: ReconConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/health", get(health))
        .route("/reconcile", post(reconcile_upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::var("TRIMATCH_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let config = ReconConfig::from_toml_str(&raw)?;
            tracing::info!(path, "loaded reconciliation config");
            config
        }
        Err(_) => ReconConfig::default(),
    };

    let addr = std::env::var("TRIMATCH_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app(config)).await?;
    Ok(())
}
