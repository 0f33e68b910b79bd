//! HTTP handlers

use super::server::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use rust_embed::RustEmbed;
use serde::Serialize;
use serde_json::json;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info};

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(RustEmbed)]
#[folder = "src/http/static/"]
struct Assets;

/// Body of a successful upload
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub status: String,
    pub message: String,
    pub paper_title: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}

/// Final path component of a client-supplied file name
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}

fn is_pdf(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Serves the embedded viewer page
pub async fn index_handler() -> Response {
    match Assets::get("index.html") {
        Some(page) => Html(String::from_utf8_lossy(page.data.as_ref()).into_owned()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "index.html not found"),
    }
}

/// Accepts one PDF in the multipart field `file` and merges it into the graph
pub async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Bytes)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes));
                        break;
                    }
                    Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
                }
            }
            Ok(None) => break,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }

    let Some((raw_name, bytes)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing multipart field 'file'");
    };
    let file_name = match sanitize_file_name(&raw_name) {
        Some(name) if is_pdf(&name) => name,
        _ => return error_response(StatusCode::BAD_REQUEST, "Only PDF files are allowed"),
    };

    let path = upload_path(&state.upload_dir, &file_name);
    if let Err(e) = save_upload(&path, &bytes).await {
        error!("Error saving {}: {}", file_name, e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    // Extraction and tree generation run before taking the graph lock
    let paper_title = crate::ingest::paper_title(Path::new(&file_name));
    let root = match state.pipeline.prepare_as(&path, &paper_title).await {
        Ok(root) => root,
        Err(e) => {
            error!("Error processing {}: {}", file_name, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let mut graph = state.graph.lock().await;
    if let Err(e) = graph.process(&paper_title, root).await {
        error!("Error processing {}: {}", file_name, e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
    info!("Processed {} as {}", file_name, paper_title);

    Json(ProcessResponse {
        status: "success".to_string(),
        message: format!("Processed {} successfully", file_name),
        paper_title,
    })
    .into_response()
}

/// `<upload_dir>/<timestamp>-<seq>/<file_name>`, distinct for every request
fn upload_path(upload_dir: &Path, file_name: &str) -> PathBuf {
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    upload_dir
        .join(format!("{}-{}", Utc::now().format("%Y%m%d%H%M%S"), seq))
        .join(file_name)
}

async fn save_upload(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await
}

/// The whole graph in node/link form
pub async fn graph_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.lock().await;
    Json(graph.export())
}

/// The whole graph as Mermaid text
pub async fn mermaid_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.lock().await;
    Json(json!({ "mermaid": graph.export_diagram() }))
}

/// Handler for system status
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.lock().await;
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "storage": graph.status(),
    }))
}

/// Processed papers in processing order
pub async fn papers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let graph = state.graph.lock().await;
    Json(graph.papers().cloned().collect::<Vec<_>>())
}
