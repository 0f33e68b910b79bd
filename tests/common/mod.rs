//! Stub collaborators shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use scholargraph::concept::{ConceptNode, TreeError, TreeGenerator, TreeResult};
use scholargraph::embed::{EmbedError, EmbedResult, EmbeddingProvider};
use scholargraph::extract::{ExtractError, ExtractResult, Sections, TextExtractor};
use scholargraph::{DiagramOptions, KnowledgeGraph, LinkingConfig};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Returns a fixed vector per concept label; unknown labels fail
#[derive(Default, Clone)]
pub struct LabelEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl LabelEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(label.to_string(), vector);
        self
    }

    pub fn insert(&mut self, label: &str, vector: Vec<f32>) {
        self.vectors.insert(label.to_string(), vector);
    }
}

#[async_trait]
impl EmbeddingProvider for LabelEmbedder {
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let label = text.split_once(": ").map(|(label, _)| label).unwrap_or(text);
        self.vectors
            .get(label)
            .cloned()
            .ok_or_else(|| EmbedError::ApiError(format!("no vector for '{}'", label)))
    }

    fn model_name(&self) -> &str {
        "label-table"
    }
}

/// Sections are `{"Abstract": <file stem>}`; stems starting with "unreadable" fail
pub struct StemExtractor;

impl TextExtractor for StemExtractor {
    fn extract_sections(&self, path: &Path) -> ExtractResult<Sections> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.starts_with("unreadable") {
            return Err(ExtractError::NoText(path.to_path_buf()));
        }
        let mut sections = Sections::new();
        sections.insert("Abstract".to_string(), stem);
        Ok(sections)
    }
}

/// Returns the tree registered for the given context text
#[derive(Default)]
pub struct TableGenerator {
    trees: HashMap<String, ConceptNode>,
}

impl TableGenerator {
    pub fn with(mut self, text: &str, tree: ConceptNode) -> Self {
        self.trees.insert(text.to_string(), tree);
        self
    }
}

#[async_trait]
impl TreeGenerator for TableGenerator {
    async fn generate(&self, text: &str) -> TreeResult<ConceptNode> {
        self.trees.get(text).cloned().ok_or_else(|| TreeError::InvalidPayload {
            reason: "model returned prose".to_string(),
            raw: format!("I could not find concepts in: {}", text),
        })
    }
}

pub fn knowledge_graph(threshold: f64, embedder: LabelEmbedder) -> KnowledgeGraph {
    let config = LinkingConfig {
        similarity_threshold: threshold,
        ..LinkingConfig::default()
    };
    KnowledgeGraph::new(config, Arc::new(embedder), DiagramOptions::default()).unwrap()
}

/// Transformer paper: root -> {attention -> {mha, sa}, pe}
pub fn transformer_tree() -> ConceptNode {
    ConceptNode::new("root", "Transformer", "Attention-only sequence model")
        .with_child(
            ConceptNode::new("attn", "Attention", "Weighs tokens")
                .with_child(ConceptNode::new("mha", "Multi-Head Attention", "Parallel heads"))
                .with_child(ConceptNode::new("sa", "Self-Attention", "Attends within a sequence")),
        )
        .with_child(ConceptNode::new("pe", "Positional Encoding", "Injects token order"))
}

/// BERT paper: root -> {mlm, encoder}
pub fn bert_tree() -> ConceptNode {
    ConceptNode::new("root", "BERT", "Bidirectional pretraining")
        .with_child(ConceptNode::new("mlm", "Masked Language Model", "Predicts masked tokens"))
        .with_child(ConceptNode::new("enc", "Transformer Encoder", "Stacked self-attention"))
}

/// Embeds both papers so that only "Self-Attention" and "Transformer Encoder"
/// are close to each other
pub fn paper_embedder() -> LabelEmbedder {
    LabelEmbedder::new()
        .with("Transformer", vec![1.0, 0.0, 0.0, 0.0])
        .with("Attention", vec![0.0, 1.0, 0.0, 0.0])
        .with("Multi-Head Attention", vec![0.0, 0.7, 0.7, 0.0])
        .with("Self-Attention", vec![0.0, 0.0, 1.0, 0.0])
        .with("Positional Encoding", vec![0.0, 0.0, 0.0, 1.0])
        .with("BERT", vec![-1.0, 0.0, 0.0, 0.0])
        .with("Masked Language Model", vec![0.0, -1.0, 0.0, 0.0])
        .with("Transformer Encoder", vec![0.0, 0.05, 1.0, 0.0])
}
