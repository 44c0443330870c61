//! HTTP Server for the sampleproc API.
//!
//! Provides REST endpoints to preview and process uploaded CSV/XLSX files.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | POST   | `/api/preview`    | Upload a file, get the processed preview  |
//! | POST   | `/api/process`    | Upload a file, download the processed one |
//! | GET    | `/api/logs`       | SSE stream for real-time logs             |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query},
    http::{header, Method},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::PreviewResponse;
use crate::config::{DEFAULT_PREVIEW_ROWS, MAX_UPLOAD_SIZE};
use crate::error::{LoadError, PipelineError, ServerError, ServerResult};
use crate::parser::{FileFormat, LoadOptions};
use crate::transform::{process_bytes, process_to_bytes, Processed};
use crate::writer::processed_output_path;

/// Server settings
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    pub port: u16,
    /// Rows returned by `/api/preview`
    pub preview_rows: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: crate::config::DEFAULT_PORT,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    start_server_with(ServerOptions {
        port,
        ..ServerOptions::default()
    })
    .await
}

/// Start the HTTP server with explicit settings
pub async fn start_server_with(options: ServerOptions) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(options.preview_rows);

    let addr = SocketAddr::from(([0, 0, 0, 0], options.port));
    info!("sampleproc server running on http://localhost:{}", options.port);
    info!("  POST /api/preview - Preview processed file");
    info!("  POST /api/process - Download processed file");
    info!("  GET  /api/logs    - SSE log stream");
    info!("  GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(preview_rows: usize) -> Router {
    // permissive CORS for local tools
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route(
            "/api/preview",
            post(move |multipart: Multipart| preview_upload(multipart, preview_rows)),
        )
        .route("/api/process", post(process_upload))
        .route("/api/logs", get(sse_logs))
        // headroom for multipart framing; the file itself is checked in read_upload
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024))
        .layer(cors)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sampleproc",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "preview": "POST /api/preview",
            "process": "POST /api/process?format=xlsx|csv",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Preview endpoint
async fn preview_upload(multipart: Multipart, preview_rows: usize) -> ServerResult<Json<PreviewResponse>> {
    let upload = read_upload(multipart).await?;
    log_info(format!(
        "Preview upload: {} ({} bytes)",
        upload.display_name(),
        upload.bytes.len()
    ));

    let format = upload.format;
    let bytes = upload.bytes;
    let processed: Processed =
        run_blocking(move || process_bytes(&bytes, format, &LoadOptions::default())).await?;

    log_success(format!(
        "Preview ready: {} rows, sample column '{}'",
        processed.table.row_count(),
        processed.report.sample_column
    ));

    Ok(Json(PreviewResponse::new(&processed, upload.file_name, preview_rows)))
}

/// Query for `/api/process`
#[derive(Debug, Default, Deserialize)]
struct ProcessQuery {
    format: Option<String>,
}

/// Process endpoint: returns the processed file as an attachment
async fn process_upload(Query(query): Query<ProcessQuery>, multipart: Multipart) -> ServerResult<Response> {
    let output_format = match query.format.as_deref() {
        None => FileFormat::Xlsx,
        Some(name) => FileFormat::from_name(name)
            .ok_or_else(|| ServerError::BadRequest(format!("unknown output format '{}'", name)))?,
    };

    let upload = read_upload(multipart).await?;
    log_info(format!(
        "Process upload: {} ({} bytes) -> {}",
        upload.display_name(),
        upload.bytes.len(),
        output_format
    ));

    let input_format = upload.format;
    let bytes = upload.bytes;
    let (out, processed) = run_blocking(move || {
        process_to_bytes(&bytes, input_format, output_format, &LoadOptions::default())
    })
    .await?;

    let download_name = processed_output_path(
        std::path::Path::new(upload.file_name.as_deref().unwrap_or("upload")),
        output_format,
    )
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| format!("processed.{}", output_format.extension()));

    log_success(format!(
        "Processed {} rows into {}",
        processed.table.row_count(),
        download_name
    ));

    Ok((
        [
            (header::CONTENT_TYPE, output_format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name.replace('"', "")),
            ),
        ],
        out,
    )
        .into_response())
}

/// A file read from a multipart body
struct Upload {
    file_name: Option<String>,
    format: FileFormat,
    bytes: Vec<u8>,
}

impl Upload {
    fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("unknown")
    }
}

/// Read the `file` field; the format comes from its file name.
async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    if bytes.len() > MAX_UPLOAD_SIZE {
        return Err(ServerError::BadRequest(format!(
            "File too large: {} bytes (max {})",
            bytes.len(),
            MAX_UPLOAD_SIZE
        )));
    }

    let name = file_name
        .clone()
        .ok_or_else(|| ServerError::BadRequest("Upload has no file name".to_string()))?;
    let format = FileFormat::from_path(std::path::Path::new(&name))
        .map_err(|ext| ServerError::from(PipelineError::from(LoadError::UnsupportedFormat(ext))))?;

    Ok(Upload {
        file_name,
        format,
        bytes,
    })
}

/// Run CPU-bound pipeline work off the async executor.
async fn run_blocking<T, F>(work: F) -> ServerResult<T>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}
