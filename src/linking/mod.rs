//! Cross-paper concept linking
//!
//! Merges one paper's concept tree into the global graph in two phases:
//!
//! 1. Embed every node (`label: summary`), upsert the vectors into the
//!    `EmbeddingIndex` as one batch and register every node as a vertex.
//! 2. Add the tree's parent -> child hierarchical edges, then query the index
//!    for each embedded node's nearest neighbors outside the paper and add a
//!    similarity edge for every neighbor strictly above the threshold.
//!
//! Edges are only ever added, so raising the threshold can only shrink the
//! resulting edge set.

use crate::concept::ConceptNode;
use crate::embed::EmbeddingProvider;
use crate::graph::{ConceptKey, EdgeKind, GraphStore, PropertyMap, PropertyValue};
use crate::vector::{EmbeddingIndex, EntryMetadata, IndexEntry, VectorError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LinkError {
    /// The paper's vectors could not be stored; nothing of the paper was written
    #[error("Index error: {0}")]
    Index(#[from] VectorError),

    #[error("Invalid linking configuration: {0}")]
    InvalidConfig(String),

    /// Empty or duplicate node ids; nothing of the paper was written
    #[error("Invalid concept tree: {0}")]
    InvalidTree(String),
}

pub type LinkResult<T> = Result<T, LinkError>;

/// Linking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Minimum cosine similarity (exclusive) for a link
    pub similarity_threshold: f64,
    /// Neighbors considered per node
    pub top_k: usize,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            top_k: 10,
        }
    }
}

impl LinkingConfig {
    pub fn validate(&self) -> LinkResult<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(LinkError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.top_k == 0 {
            return Err(LinkError::InvalidConfig("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// A similarity edge created while linking a paper
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundLink {
    pub source: ConceptKey,
    pub target: ConceptKey,
    pub kind: EdgeKind,
    pub similarity: f64,
}

/// Outcome of linking one paper
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkReport {
    pub paper_title: String,
    pub nodes_registered: usize,
    pub embedding_failures: usize,
    pub hierarchical_edges: usize,
    pub query_failures: usize,
    pub links: Vec<FoundLink>,
}

impl LinkReport {
    pub fn cross_paper_links(&self) -> impl Iterator<Item = &FoundLink> {
        self.links.iter().filter(|l| l.kind == EdgeKind::CrossPaper)
    }
}

/// Runs both linking phases against a graph and an index
pub struct LinkingEngine {
    config: LinkingConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl LinkingEngine {
    pub fn new(config: LinkingConfig, embedder: Arc<dyn EmbeddingProvider>) -> LinkResult<Self> {
        config.validate()?;
        Ok(Self { config, embedder })
    }

    pub fn config(&self) -> &LinkingConfig {
        &self.config
    }

    /// Merge one paper's tree into `graph` and `index`.
    ///
    /// Fills in `embedding` on every node that could be embedded. An index
    /// error (dimension mismatch) or an invalid tree aborts before any vertex
    /// of the paper is written.
    pub async fn link_paper(
        &self,
        paper_title: &str,
        root: &mut ConceptNode,
        graph: &mut GraphStore,
        index: &mut EmbeddingIndex,
    ) -> LinkResult<LinkReport> {
        root.validate().map_err(LinkError::InvalidTree)?;

        let mut report = LinkReport {
            paper_title: paper_title.to_string(),
            ..LinkReport::default()
        };

        // Phase 1: embed
        let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
        let mut batch = Vec::new();
        for node in root.flatten() {
            let text = node.embedding_text();
            match self.embedder.embed(&text).await {
                Ok(vector) => {
                    batch.push(IndexEntry {
                        id: ConceptKey::new(paper_title, &node.id),
                        vector: vector.clone(),
                        metadata: EntryMetadata {
                            label: node.label.clone(),
                            node_id: node.id.clone(),
                            paper_title: paper_title.to_string(),
                        },
                        text,
                    });
                    vectors.insert(node.id.clone(), vector);
                }
                Err(e) => {
                    warn!("Error embedding node {} of {}: {}", node.id, paper_title, e);
                    report.embedding_failures += 1;
                }
            }
        }

        let batch_len = batch.len();
        index.upsert(batch)?;
        debug!(paper = paper_title, entries = batch_len, "index updated");

        root.for_each_mut(&mut |node| {
            if let Some(vector) = vectors.get(&node.id) {
                node.embedding = Some(vector.clone());
            }
        });

        // Phase 1: register vertices
        if graph.contains_vertex(&ConceptKey::new(paper_title, &root.id)) {
            warn!("Paper {} was already processed, overwriting its concepts", paper_title);
        }
        for node in root.flatten() {
            let mut properties = PropertyMap::new();
            properties.insert("label".to_string(), PropertyValue::from(node.label.as_str()));
            properties.insert("summary".to_string(), PropertyValue::from(node.summary.as_str()));
            properties.insert("type".to_string(), PropertyValue::from("concept"));
            properties.insert("paper".to_string(), PropertyValue::from(paper_title));
            graph.add_vertex(ConceptKey::new(paper_title, &node.id), properties);
            report.nodes_registered += 1;
        }

        // Phase 2: hierarchy
        for (parent, child) in root.parent_child_pairs() {
            let parent = ConceptKey::new(paper_title, parent);
            let child = ConceptKey::new(paper_title, child);
            graph.add_edge(&parent, &child, EdgeKind::Hierarchical, None);
            report.hierarchical_edges += 1;
        }

        // Phase 2: similarity
        for node in root.flatten() {
            let Some(vector) = node.embedding.as_deref() else {
                continue;
            };
            let key = ConceptKey::new(paper_title, &node.id);

            let neighbors = match index.query_excluding(vector, self.config.top_k, paper_title) {
                Ok(neighbors) => neighbors,
                Err(e) => {
                    warn!("Error querying neighbors of {}: {}", key, e);
                    report.query_failures += 1;
                    continue;
                }
            };

            for neighbor in neighbors {
                let similarity = neighbor.similarity();
                if similarity <= self.config.similarity_threshold || neighbor.id == key {
                    continue;
                }
                let kind = if neighbor.paper_title != paper_title {
                    EdgeKind::CrossPaper
                } else {
                    EdgeKind::SemanticRelated
                };

                if kind == EdgeKind::CrossPaper {
                    info!(
                        "Cross-paper link: {} <-> {} (similarity {:.4})",
                        key, neighbor.id, similarity
                    );
                }
                graph.add_edge(&key, &neighbor.id, kind, Some(similarity));
                report.links.push(FoundLink {
                    source: key.clone(),
                    target: neighbor.id,
                    kind,
                    similarity,
                });
            }
        }

        info!(
            "Linked {}: {} nodes, {} hierarchical edges, {} similarity links",
            paper_title,
            report.nodes_registered,
            report.hierarchical_edges,
            report.links.len()
        );
        Ok(report)
    }
}
