//! Knowledge graph service
//!
//! Owns the concept graph, the embedding index, the linking engine and the
//! registry of processed papers. Papers are processed one at a time; each
//! paper's linking observes every paper registered before it.

use crate::concept::{ConceptNode, PaperRecord};
use crate::embed::EmbeddingProvider;
use crate::export::{DiagramOptions, GraphExporter};
use crate::graph::{GraphStatistics, GraphStore, Interchange, InterchangeLink};
use crate::linking::{LinkReport, LinkResult, LinkingConfig, LinkingEngine};
use crate::vector::EmbeddingIndex;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// A paper merged into the graph
#[derive(Debug, Clone, Serialize)]
pub struct PaperSummary {
    pub title: String,
    pub root_label: String,
    pub node_count: usize,
    pub depth: usize,
    pub cross_paper_links: usize,
    pub processed_at: DateTime<Utc>,
}

/// Counts reported by `GET /api/status`
#[derive(Debug, Clone, Serialize)]
pub struct StorageStatus {
    pub nodes: usize,
    pub edges: usize,
    pub papers: usize,
}

pub struct KnowledgeGraph {
    graph: GraphStore,
    index: EmbeddingIndex,
    engine: LinkingEngine,
    exporter: GraphExporter,
    papers: IndexMap<String, PaperRecord>,
    summaries: IndexMap<String, PaperSummary>,
}

impl KnowledgeGraph {
    pub fn new(
        config: LinkingConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        diagram: DiagramOptions,
    ) -> LinkResult<Self> {
        Ok(Self {
            graph: GraphStore::new(),
            index: EmbeddingIndex::new(),
            engine: LinkingEngine::new(config, embedder)?,
            exporter: GraphExporter::new(diagram),
            papers: IndexMap::new(),
            summaries: IndexMap::new(),
        })
    }

    /// Embed, register and link one paper's concept tree
    pub async fn process(&mut self, paper_title: &str, mut root: ConceptNode) -> LinkResult<LinkReport> {
        let report = self
            .engine
            .link_paper(paper_title, &mut root, &mut self.graph, &mut self.index)
            .await?;

        let summary = PaperSummary {
            title: paper_title.to_string(),
            root_label: root.label.clone(),
            node_count: root.node_count(),
            depth: root.depth(),
            cross_paper_links: report.cross_paper_links().count(),
            processed_at: Utc::now(),
        };
        self.summaries.insert(paper_title.to_string(), summary);
        self.papers
            .insert(paper_title.to_string(), PaperRecord::new(paper_title, root));
        Ok(report)
    }

    /// Node/link interchange form of the whole graph
    pub fn export(&self) -> Interchange {
        self.graph.to_interchange()
    }

    /// Mermaid rendering of the whole graph
    pub fn export_diagram(&self) -> String {
        self.exporter.render_mermaid(&self.export())
    }

    pub fn exporter(&self) -> &GraphExporter {
        &self.exporter
    }

    /// Processed papers in processing order
    pub fn papers(&self) -> impl Iterator<Item = &PaperSummary> {
        self.summaries.values()
    }

    pub fn paper(&self, title: &str) -> Option<&PaperRecord> {
        self.papers.get(title)
    }

    pub fn status(&self) -> StorageStatus {
        StorageStatus {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            papers: self.papers.len(),
        }
    }

    pub fn statistics(&self) -> GraphStatistics {
        self.graph.statistics()
    }

    /// Links typed `cross-paper`, in insertion order
    pub fn cross_paper_links(&self) -> Vec<InterchangeLink> {
        self.export().cross_paper_links().cloned().collect()
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }
}
