//! HTTP interface.
//!
//! Serves an upload page and a small JSON API over the same grading
//! pipeline the CLI uses.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | Upload page |
//! | `GET /health` | Liveness check |
//! | `POST /api/grade` | Grade `answer_key` + `students` uploads |
//! | `POST /api/detect` | Show what the detector reads from one `sheet` |

mod error;
mod page;

pub use error::ApiError;

use anyhow::{Context, Result};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::Config;
use crate::detect::{BubbleDetector, Detection, MarkDetector};
use crate::error::OmrError;
use crate::imaging::decode_sheet;
use crate::output::{format_report_to_string, OutputFormat, CSV_FILE_NAME};
use crate::pipeline::{GradingSession, SheetInput};

/// Shared handler state.
pub struct AppState {
    session: GradingSession,
    detector: BubbleDetector,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            session: GradingSession::new(config),
            detector: BubbleDetector::new(config.detection.clone()),
        }
    }
}

/// Builds the application router.
pub fn router(config: &Config) -> Router {
    let state = Arc::new(AppState::new(config));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/grade", post(grade))
        .route("/api/detect", post(detect))
        .layer(DefaultBodyLimit::max(
            config.server.max_upload_mb.saturating_mul(1024 * 1024),
        ))
        .with_state(state)
}

/// Serves on an already bound listener until ctrl-c.
pub async fn serve_on(listener: TcpListener, config: &Config) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("OMR grading server listening on http://{}", addr);

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Binds `host:port`. `host` may be an IP literal (v4 or v6) or a name.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {} port {}", host, port))
}

/// Binds `host:port` and serves.
pub async fn serve(config: &Config, host: &str, port: u16) -> Result<()> {
    let listener = bind(host, port).await?;
    serve_on(listener, config).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct GradeParams {
    format: Option<String>,
}

#[derive(Default)]
struct Uploads {
    answer_key: Option<SheetInput>,
    students: Vec<(String, Vec<u8>)>,
    sheet: Option<(String, Vec<u8>)>,
    format: Option<String>,
}

fn upload_error(err: MultipartError) -> ApiError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Upload exceeds the server's size limit",
        ),
        status => ApiError::new(status, format!("Malformed upload: {}", err.body_text())),
    }
}

async fn read_uploads(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Uploads, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::bad_request(format!("Expected a multipart upload: {}", rejection.body_text()))
    })?;
    let mut uploads = Uploads::default();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let bytes = field.bytes().await.map_err(upload_error)?;

        // Browsers submit an empty part for an untouched file input
        if bytes.is_empty() && file_name.is_none() {
            continue;
        }

        let source = file_name.unwrap_or_else(|| name.clone());
        match name.as_str() {
            "answer_key" => {
                uploads.answer_key = Some(SheetInput::new("Answer Key", source, bytes.to_vec()))
            }
            "students" | "student" => uploads.students.push((source, bytes.to_vec())),
            "sheet" => uploads.sheet = Some((source, bytes.to_vec())),
            "format" => uploads.format = Some(String::from_utf8_lossy(&bytes).trim().to_string()),
            other => debug!(field = other, "ignoring unknown upload field"),
        }
    }

    Ok(uploads)
}

async fn grade(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GradeParams>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let uploads = read_uploads(multipart).await?;

    let format = uploads
        .format
        .as_deref()
        .or(params.format.as_deref())
        .unwrap_or("json")
        .parse::<OutputFormat>()
        .map_err(ApiError::bad_request)?;
    if format == OutputFormat::Table {
        return Err(ApiError::bad_request("Use format json, csv or html"));
    }

    let key = uploads.answer_key.ok_or(OmrError::MissingKey)?;
    let students = SheetInput::numbered(uploads.students);

    let report = state.session.run(key, students).await?;
    if report.results.is_empty() {
        return Err(ApiError::no_results(&report));
    }

    let body = format_report_to_string(&report, format)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    let response = match format {
        OutputFormat::Csv => (
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", CSV_FILE_NAME),
                ),
            ],
            body,
        )
            .into_response(),
        _ => ([(header::CONTENT_TYPE, format.content_type())], body).into_response(),
    };
    Ok(response)
}

#[derive(Serialize)]
struct DetectResponse {
    source: String,
    detector: &'static str,
    #[serde(flatten)]
    detection: Detection,
}

async fn detect(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let uploads = read_uploads(multipart).await?;
    let (source, bytes) = uploads
        .sheet
        .ok_or_else(|| ApiError::bad_request("Missing 'sheet' upload"))?;

    let detector = state.detector.clone();
    let detection = tokio::task::spawn_blocking(move || {
        decode_sheet(&bytes).map(|gray| detector.detect(&gray))
    })
    .await
    .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e))??;

    Ok(Json(DetectResponse {
        source,
        detector: state.detector.name(),
        detection,
    }))
}
