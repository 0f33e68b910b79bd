//! ScholarGraph
//!
//! Builds a cross-paper knowledge graph from research PDFs. Each paper is
//! turned into a hierarchical concept tree by a language model, every concept
//! is embedded, and concepts from different papers whose embeddings are
//! highly similar are linked.
//!
//! # Architecture
//!
//! - `concept`: concept trees and their strict parsing from model output
//! - `vector`: exact cosine-similarity index with paper filtering
//! - `graph`: undirected attributed graph of concepts
//! - `linking`: merges one paper's tree into the graph and index
//! - `export`: interchange JSON and Mermaid rendering
//! - `service`: the `KnowledgeGraph` owning all of the above
//! - `extract`, `embed`, `ingest`: PDF text, embedding clients, pipeline
//! - `http`: upload API and viewer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scholargraph::{ConceptNode, DiagramOptions, EmbeddingClient, EmbeddingConfig, KnowledgeGraph, LinkingConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Arc::new(EmbeddingClient::new(&EmbeddingConfig::default())?);
//! let mut kg = KnowledgeGraph::new(LinkingConfig::default(), embedder, DiagramOptions::default())?;
//!
//! let root = ConceptNode::new("root", "Transformer", "Attention-only sequence model")
//!     .with_child(ConceptNode::new("mha", "Multi-Head Attention", "Parallel attention heads"));
//! let report = kg.process("attention", root).await?;
//! println!("{} similarity links", report.links.len());
//! println!("{}", kg.export_diagram());
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod concept;
pub mod config;
pub mod embed;
pub mod export;
pub mod extract;
pub mod graph;
pub mod http;
pub mod ingest;
pub mod linking;
pub mod service;
pub mod vector;

// Re-export main types for convenience
pub use concept::{
    parse_concept_tree, ConceptNode, LlmTreeGenerator, PaperRecord, TreeError, TreeGenerator,
    TreeResult,
};

pub use config::{
    AppConfig, ConfigError, ConfigResult, EmbeddingConfig, ExtractionConfig, LLMProvider,
    LlmConfig, ServerConfig,
};

pub use embed::{EmbedError, EmbedResult, EmbeddingClient, EmbeddingProvider};

pub use export::{DiagramOptions, GraphExporter};

pub use extract::{context_text, ExtractError, ExtractResult, PdfTextExtractor, Sections, TextExtractor};

pub use graph::{
    ConceptKey, Edge, EdgeKind, GraphError, GraphResult, GraphStatistics, GraphStore, Interchange,
    InterchangeLink, InterchangeNode, PropertyMap, PropertyValue, Vertex,
};

pub use ingest::{collect_pdfs, BatchSummary, PaperFailure, Pipeline, ProcessError, ProcessResult};

pub use linking::{FoundLink, LinkError, LinkReport, LinkResult, LinkingConfig, LinkingEngine};

pub use service::{KnowledgeGraph, PaperSummary, StorageStatus};

pub use vector::{EmbeddingIndex, Neighbor, VectorError, VectorResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
