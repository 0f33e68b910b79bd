//! Node/link interchange form of the graph
//!
//! This is the JSON shape served by `GET /graph` and written by the CLI:
//! `{"directed": false, "multigraph": false, "nodes": [...], "links": [...]}`.
//! It also deserializes, so saved graphs can be inspected or rendered later.

use super::property::PropertyMap;
use super::types::EdgeKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interchange {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    pub nodes: Vec<InterchangeNode>,
    pub links: Vec<InterchangeLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeNode {
    pub id: String,
    #[serde(flatten)]
    pub attributes: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterchangeLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default = "default_link_kind")]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

fn default_link_kind() -> EdgeKind {
    EdgeKind::Hierarchical
}

impl Interchange {
    pub fn empty() -> Self {
        Interchange {
            directed: false,
            multigraph: false,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Map of node id to its `label` attribute
    pub fn labels(&self) -> HashMap<&str, &str> {
        self.nodes
            .iter()
            .filter_map(|n| {
                n.attributes
                    .get("label")
                    .and_then(|v| v.as_string())
                    .map(|label| (n.id.as_str(), label))
            })
            .collect()
    }

    /// Display label of a node, falling back to its raw id
    pub fn label_or_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.attributes.get("label"))
            .and_then(|v| v.as_string())
            .unwrap_or(id)
    }

    /// Links typed `cross-paper`
    pub fn cross_paper_links(&self) -> impl Iterator<Item = &InterchangeLink> {
        self.links.iter().filter(|l| l.kind == EdgeKind::CrossPaper)
    }

    /// Links whose endpoints belong to different papers according to the
    /// nodes' `paper` attribute, regardless of the stored link type
    pub fn inter_paper_links(&self) -> Vec<&InterchangeLink> {
        let papers: HashMap<&str, &str> = self
            .nodes
            .iter()
            .filter_map(|n| {
                n.attributes
                    .get("paper")
                    .and_then(|v| v.as_string())
                    .map(|p| (n.id.as_str(), p))
            })
            .collect();

        self.links
            .iter()
            .filter(|l| match (papers.get(l.source.as_str()), papers.get(l.target.as_str())) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            })
            .collect()
    }
}

impl Default for Interchange {
    fn default() -> Self {
        Self::empty()
    }
}
