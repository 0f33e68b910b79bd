//! Edge implementation for the concept graph

use super::types::{ConceptKey, EdgeKind};
use serde::{Deserialize, Serialize};

/// An edge between two concepts
///
/// The graph is undirected for identity purposes (one edge per unordered
/// pair) but the first-seen orientation is kept so hierarchical edges still
/// read parent -> child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: ConceptKey,
    pub target: ConceptKey,
    pub kind: EdgeKind,
    /// Cosine similarity, present on similarity edges only
    pub weight: Option<f64>,
}

impl Edge {
    /// The endpoint opposite to `key`, if `key` is an endpoint
    pub fn other(&self, key: &ConceptKey) -> Option<&ConceptKey> {
        if &self.source == key {
            Some(&self.target)
        } else if &self.target == key {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Overwrite attributes with a later insertion of the same pair.
    /// A missing weight leaves the stored one in place, except that
    /// hierarchical edges never carry a weight.
    pub fn merge(&mut self, kind: EdgeKind, weight: Option<f64>) {
        self.kind = kind;
        if kind == EdgeKind::Hierarchical {
            self.weight = None;
        } else if weight.is_some() {
            self.weight = weight;
        }
    }
}

/// Order-independent key for an endpoint pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EdgeKey(ConceptKey, ConceptKey);

impl EdgeKey {
    pub(crate) fn new(u: &ConceptKey, v: &ConceptKey) -> Self {
        if u <= v {
            EdgeKey(u.clone(), v.clone())
        } else {
            EdgeKey(v.clone(), u.clone())
        }
    }
}
