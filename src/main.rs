use anyhow::Context;
use scholargraph::http::{AppState, HttpServer};
use scholargraph::{AppConfig, EmbeddingClient, KnowledgeGraph, Pipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var_os("SCHOLARGRAPH_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;

    info!("ScholarGraph v{}", scholargraph::version());
    info!(
        "Embedding model: {:?}/{}, tree model: {:?}/{}, threshold {}",
        config.embedding.provider,
        config.embedding.model,
        config.llm.provider,
        config.llm.model,
        config.linking.similarity_threshold
    );

    let embedder = EmbeddingClient::new(&config.embedding).context("creating embedding client")?;
    let graph = KnowledgeGraph::new(config.linking.clone(), Arc::new(embedder), config.diagram.clone())?;
    let pipeline = Pipeline::from_config(&config).context("creating ingestion pipeline")?;

    let state = AppState::new(graph, pipeline, config.server.upload_dir.clone());
    let server = HttpServer::new(state, config.server.address.clone(), config.server.port);
    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    Ok(())
}
