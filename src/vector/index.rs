//! Exact cosine-similarity index over concept embeddings
//!
//! Entries are keyed by composite concept id and tagged with the paper they
//! came from, so queries can exclude the querying paper. Search is brute
//! force: every stored vector is scored (in parallel) and candidates are
//! ranked by ascending distance, ties in insertion order.

use crate::graph::ConceptKey;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vector index errors
#[derive(Error, Debug, PartialEq)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Empty vector for {0}")]
    EmptyVector(ConceptKey),
}

pub type VectorResult<T> = Result<T, VectorError>;

/// Metadata stored next to each vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub label: String,
    /// Node id inside its paper (without the title prefix)
    pub node_id: String,
    pub paper_title: String,
}

/// One upsert record
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub id: ConceptKey,
    pub vector: Vec<f32>,
    pub metadata: EntryMetadata,
    /// The text the vector was computed from
    pub text: String,
}

/// A query hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub id: ConceptKey,
    /// Cosine distance (1 - cosine similarity)
    pub distance: f64,
    pub paper_title: String,
}

impl Neighbor {
    pub fn similarity(&self) -> f64 {
        1.0 - self.distance
    }
}

/// Cosine distance between two vectors, accumulated in f64.
///
/// Zero-norm inputs are maximally distant (1.0).
pub fn cosine_distance(va: &[f32], vb: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (a, b) in va.iter().zip(vb.iter()) {
        let (a, b) = (*a as f64, *b as f64);
        dot += a * b;
        norm_a += a * a;
        norm_b += b * b;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 1.0;
    }

    let sim = (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0);
    1.0 - sim
}

/// Similarity-searchable store of concept embeddings
#[derive(Debug, Default)]
pub struct EmbeddingIndex {
    /// Fixed on first insert unless configured up front
    dimensions: Option<usize>,
    entries: Vec<IndexEntry>,
    slots: FxHashMap<ConceptKey, usize>,
}

impl EmbeddingIndex {
    /// Create an index whose dimensionality is taken from the first insert
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index for a known embedding dimensionality
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: Some(dimensions),
            ..Self::default()
        }
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &ConceptKey) -> Option<&IndexEntry> {
        self.slots.get(id).map(|&slot| &self.entries[slot])
    }

    pub fn contains(&self, id: &ConceptKey) -> bool {
        self.slots.contains_key(id)
    }

    /// Insert or replace a batch of entries.
    ///
    /// The whole batch is validated before anything is written, so a
    /// dimension mismatch leaves the index untouched. Replaced entries keep
    /// their original insertion position.
    pub fn upsert(&mut self, batch: Vec<IndexEntry>) -> VectorResult<()> {
        let mut expected = self.dimensions;
        for entry in &batch {
            if entry.vector.is_empty() {
                return Err(VectorError::EmptyVector(entry.id.clone()));
            }
            match expected {
                Some(dim) if dim != entry.vector.len() => {
                    return Err(VectorError::DimensionMismatch {
                        expected: dim,
                        got: entry.vector.len(),
                    });
                }
                Some(_) => {}
                None => expected = Some(entry.vector.len()),
            }
        }
        self.dimensions = expected;

        for entry in batch {
            match self.slots.get(&entry.id) {
                Some(&slot) => self.entries[slot] = entry,
                None => {
                    self.slots.insert(entry.id.clone(), self.entries.len());
                    self.entries.push(entry);
                }
            }
        }
        Ok(())
    }

    /// Up to `k` nearest entries whose paper is not `excluded_paper_title`
    pub fn query_excluding(&self, query: &[f32], k: usize, excluded_paper_title: &str) -> VectorResult<Vec<Neighbor>> {
        self.query_filtered(query, k, |entry| entry.metadata.paper_title != excluded_paper_title)
    }

    /// Up to `k` nearest entries over the whole index
    pub fn query(&self, query: &[f32], k: usize) -> VectorResult<Vec<Neighbor>> {
        self.query_filtered(query, k, |_| true)
    }

    fn query_filtered<F>(&self, query: &[f32], k: usize, keep: F) -> VectorResult<Vec<Neighbor>>
    where
        F: Fn(&IndexEntry) -> bool + Send + Sync,
    {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(dim) = self.dimensions {
            if query.len() != dim {
                return Err(VectorError::DimensionMismatch {
                    expected: dim,
                    got: query.len(),
                });
            }
        }

        // (slot, distance); slot order is insertion order
        let mut scored: Vec<(usize, f64)> = self
            .entries
            .par_iter()
            .enumerate()
            .filter(|(_, entry)| keep(*entry))
            .map(|(slot, entry)| (slot, cosine_distance(query, &entry.vector)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(slot, distance)| {
                let entry = &self.entries[slot];
                Neighbor {
                    id: entry.id.clone(),
                    distance,
                    paper_title: entry.metadata.paper_title.clone(),
                }
            })
            .collect())
    }
}
