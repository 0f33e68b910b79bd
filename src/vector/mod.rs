//! Concept embedding index
//!
//! This module provides exact cosine nearest-neighbor search over concept
//! embeddings, with per-paper exclusion.

pub mod index;

pub use index::{
    cosine_distance, EmbeddingIndex, EntryMetadata, IndexEntry, Neighbor, VectorError, VectorResult,
};
