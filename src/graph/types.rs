//! Core type definitions for the concept graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global identifier of a concept node: `<paper_title>_<node_id>`
///
/// Node ids are only unique within one paper; the title prefix makes them
/// unique across the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConceptKey(String);

impl ConceptKey {
    /// Build the composite key for `node_id` inside `paper_title`
    pub fn new(paper_title: &str, node_id: &str) -> Self {
        ConceptKey(format!("{}_{}", paper_title, node_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConceptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConceptKey {
    fn from(s: String) -> Self {
        ConceptKey(s)
    }
}

impl From<&str> for ConceptKey {
    fn from(s: &str) -> Self {
        ConceptKey(s.to_string())
    }
}

impl AsRef<str> for ConceptKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of relationship between two concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum EdgeKind {
    /// Parent -> child inside one paper's concept tree
    #[serde(rename = "hierarchical")]
    Hierarchical,
    /// Similarity edge between two concepts of the same paper
    #[serde(rename = "semantic-related")]
    SemanticRelated,
    /// Similarity edge between concepts of two different papers
    #[serde(rename = "cross-paper")]
    CrossPaper,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Hierarchical => "hierarchical",
            EdgeKind::SemanticRelated => "semantic-related",
            EdgeKind::CrossPaper => "cross-paper",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
