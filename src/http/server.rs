//! HTTP server for the upload API and the graph viewer

use super::handler::{
    graph_handler, index_handler, mermaid_handler, papers_handler, status_handler, upload_handler,
};
use crate::ingest::Pipeline;
use crate::service::KnowledgeGraph;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub graph: Arc<Mutex<KnowledgeGraph>>,
    pub pipeline: Arc<Pipeline>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(graph: KnowledgeGraph, pipeline: Pipeline, upload_dir: PathBuf) -> Self {
        Self {
            graph: Arc::new(Mutex::new(graph)),
            pipeline: Arc::new(pipeline),
            upload_dir,
        }
    }
}

/// All routes with tracing and permissive CORS
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/upload", post(upload_handler))
        .route("/graph", get(graph_handler))
        .route("/graph/mermaid", get(mermaid_handler))
        .route("/api/status", get(status_handler))
        .route("/api/papers", get(papers_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server managing the API and static assets
pub struct HttpServer {
    state: AppState,
    address: String,
    port: u16,
}

impl HttpServer {
    pub fn new(state: AppState, address: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            address: address.into(),
            port,
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        tokio::fs::create_dir_all(&self.state.upload_dir).await?;
        let app = build_router(self.state.clone());

        let addr = format!("{}:{}", self.address, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("ScholarGraph available at http://localhost:{}", self.port);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
