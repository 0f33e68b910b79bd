//! Concept trees
//!
//! One tree per paper: a root topic, its sub-components, and their details.
//! Trees come from a language model as JSON and are parsed strictly here:
//! every node needs a non-empty `id` and `label`, and ids must be unique
//! within the tree. A rejected payload is returned with the error so it can
//! be logged.

pub mod generator;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub use generator::{LlmTreeGenerator, TreeGenerator, CONCEPT_TREE_PROMPT};

#[derive(Error, Debug)]
pub enum TreeError {
    /// Model output that is not a valid concept tree
    #[error("Invalid concept tree: {reason}")]
    InvalidPayload { reason: String, raw: String },

    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TreeError {
    fn invalid(reason: impl Into<String>, raw: &str) -> Self {
        TreeError::InvalidPayload {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// Raw model output attached to a parse failure
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            TreeError::InvalidPayload { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

/// One concept in a paper's tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptNode {
    /// Unique within its paper
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub summary: String,
    /// Filled in by the linking engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub children: Vec<ConceptNode>,
}

impl ConceptNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, summary: impl Into<String>) -> Self {
        ConceptNode {
            id: id.into(),
            label: label.into(),
            summary: summary.into(),
            embedding: None,
            children: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: ConceptNode) -> Self {
        self.children.push(child);
        self
    }

    /// Text the embedding is computed from
    pub fn embedding_text(&self) -> String {
        format!("{}: {}", self.label, self.summary)
    }

    /// All nodes in pre-order
    pub fn flatten(&self) -> Vec<&ConceptNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Mutable pre-order walk
    pub fn for_each_mut<F: FnMut(&mut ConceptNode)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    /// Every (parent id, child id) pair, in pre-order of the parent
    pub fn parent_child_pairs(&self) -> Vec<(&str, &str)> {
        self.flatten()
            .into_iter()
            .flat_map(|parent| {
                parent
                    .children
                    .iter()
                    .map(move |child| (parent.id.as_str(), child.id.as_str()))
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Number of levels, a leaf has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Check the structural rules: non-empty ids and labels, unique ids
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for node in self.flatten() {
            if node.id.trim().is_empty() {
                return Err(format!("node labelled {:?} has an empty id", node.label));
            }
            if node.label.trim().is_empty() {
                return Err(format!("node {:?} has an empty label", node.id));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(format!("duplicate node id {:?}", node.id));
            }
        }
        Ok(())
    }
}

/// A processed paper and its concept tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// Paper identifier, unique across the corpus
    pub title: String,
    pub root: ConceptNode,
}

impl PaperRecord {
    pub fn new(title: impl Into<String>, root: ConceptNode) -> Self {
        PaperRecord {
            title: title.into(),
            root,
        }
    }
}

/// Pull the JSON object out of a model response that may be wrapped in
/// markdown fences or surrounded by prose.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        // Skip language tag (e.g. "json\n")
        let code_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        if let Some(end) = after_fence[code_start..].find("```") {
            return after_fence[code_start..code_start + end].trim();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parse and validate a concept tree from raw model output
pub fn parse_concept_tree(raw: &str) -> TreeResult<ConceptNode> {
    let json = extract_json(raw);
    if json.is_empty() {
        return Err(TreeError::invalid("empty response", raw));
    }

    let root: ConceptNode =
        serde_json::from_str(json).map_err(|e| TreeError::invalid(e.to_string(), raw))?;
    root.validate().map_err(|reason| TreeError::invalid(reason, raw))?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_level() -> ConceptNode {
        ConceptNode::new("root", "Transformer", "Attention-only architecture")
            .with_child(
                ConceptNode::new("attn", "Attention", "Weighs tokens")
                    .with_child(ConceptNode::new("mha", "Multi-Head Attention", "Parallel heads"))
                    .with_child(ConceptNode::new("sa", "Self-Attention", "Same-sequence attention")),
            )
            .with_child(ConceptNode::new("pe", "Positional Encoding", "Order signal"))
    }

    #[test]
    fn test_flatten_is_preorder() {
        let tree = three_level();
        let ids: Vec<&str> = tree.flatten().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "attn", "mha", "sa", "pe"]);
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_parent_child_pairs() {
        let tree = three_level();
        assert_eq!(
            tree.parent_child_pairs(),
            vec![("root", "attn"), ("root", "pe"), ("attn", "mha"), ("attn", "sa")]
        );
    }

    #[test]
    fn test_embedding_text() {
        let node = ConceptNode::new("a", "Attention", "Weighs tokens");
        assert_eq!(node.embedding_text(), "Attention: Weighs tokens");
    }

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{"id": "root", "label": "Topic", "summary": "s", "children": [
            {"id": "c1", "label": "Child"}
        ]}"#;
        let tree = parse_concept_tree(raw).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].summary, "");
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"id\": \"r\", \"label\": \"Root\", \"summary\": \"x\"}\n```";
        assert_eq!(parse_concept_tree(raw).unwrap().label, "Root");
    }

    #[test]
    fn test_parse_json_with_prose() {
        let raw = "Here is the tree: {\"id\": \"r\", \"label\": \"Root\"} Hope it helps.";
        assert_eq!(parse_concept_tree(raw).unwrap().id, "r");
    }

    #[test]
    fn test_reject_not_json() {
        let err = parse_concept_tree("I cannot help with that").unwrap_err();
        assert_eq!(err.raw_payload(), Some("I cannot help with that"));
    }

    #[test]
    fn test_reject_empty_label() {
        let raw = r#"{"id": "r", "label": "Root", "children": [{"id": "c", "label": "  "}]}"#;
        match parse_concept_tree(raw) {
            Err(TreeError::InvalidPayload { reason, raw: payload }) => {
                assert!(reason.contains("empty label"));
                assert_eq!(payload, raw);
            }
            other => panic!("expected invalid payload, got {:?}", other),
        }
    }

    #[test]
    fn test_reject_empty_id_and_duplicates() {
        let empty_id = r#"{"id": "", "label": "Root"}"#;
        assert!(parse_concept_tree(empty_id).is_err());

        let dup = r#"{"id": "r", "label": "Root", "children": [{"id": "r", "label": "Again"}]}"#;
        let err = parse_concept_tree(dup).unwrap_err();
        assert!(err.to_string().contains("duplicate node id"));
    }

    #[test]
    fn test_reject_missing_label_field() {
        assert!(parse_concept_tree(r#"{"id": "r"}"#).is_err());
        assert!(parse_concept_tree("").is_err());
    }

    #[test]
    fn test_for_each_mut_visits_all() {
        let mut tree = three_level();
        let mut visited = 0;
        tree.for_each_mut(&mut |node| {
            node.embedding = Some(vec![1.0]);
            visited += 1;
        });
        assert_eq!(visited, 5);
        assert!(tree.flatten().iter().all(|n| n.embedding.is_some()));
    }
}
