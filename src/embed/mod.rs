//! Text embedding
//!
//! The linking engine only needs `text -> vector`; providers live behind the
//! `EmbeddingProvider` trait so tests and alternative backends can plug in.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;

pub use client::EmbeddingClient;

/// Embed errors
#[derive(Error, Debug)]
pub enum EmbedError {
    /// API error from the provider
    #[error("Embedding API error: {0}")]
    ApiError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Provider answered with no vector
    #[error("Empty embedding returned for input")]
    EmptyEmbedding,
}

pub type EmbedResult<T> = Result<T, EmbedError>;

/// Produces fixed-length vectors in one cosine metric space
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}
