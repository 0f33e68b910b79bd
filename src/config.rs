//! Application configuration
//!
//! Every section has defaults, so an empty (or missing) YAML file yields a
//! working configuration. API keys missing from the file are taken from the
//! environment (`OPENAI_API_KEY`, `GEMINI_API_KEY`).

use crate::export::DiagramOptions;
use crate::linking::LinkingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Remote model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Ollama,
    Gemini,
}

impl LLMProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMProvider::OpenAI => "https://api.openai.com/v1",
            LLMProvider::Ollama => "http://localhost:11434",
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Environment variable consulted when no API key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Gemini => Some("GEMINI_API_KEY"),
            LLMProvider::Ollama => None,
        }
    }
}

/// Configuration for the embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: LLMProvider,
    /// Model name (e.g., "all-minilm", "text-embedding-3-small")
    pub model: String,
    pub api_key: Option<String>,
    /// API Base URL (defaults per provider)
    pub api_base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Ollama,
            model: "all-minilm".to_string(),
            api_key: None,
            api_base_url: None,
            timeout_secs: 30,
        }
    }
}

/// Configuration for concept-tree generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub temperature: f32,
    /// Overrides the built-in extraction prompt
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_base_url: None,
            temperature: 0.1,
            system_prompt: None,
            timeout_secs: 60,
        }
    }
}

/// Limits applied when assembling the text sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Cap on the context when no Abstract/Introduction/Conclusion was found
    pub max_context_chars: usize,
    /// Cap on the "Full Content" fallback section
    pub full_text_cap: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 8000,
            full_text_cap: 10_000,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    pub port: u16,
    /// Where uploaded PDFs are written
    pub upload_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub linking: LinkingConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
    pub server: ServerConfig,
    pub diagram: DiagramOptions,
}

impl AppConfig {
    /// Load from an optional YAML file, fill API keys from the environment
    /// and validate.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML; an empty document yields the defaults
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Fill missing API keys using `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.embedding.api_key.is_none() {
            if let Some(var) = self.embedding.provider.api_key_env() {
                self.embedding.api_key = lookup(var);
            }
        }
        if self.llm.api_key.is_none() {
            if let Some(var) = self.llm.provider.api_key_env() {
                self.llm.api_key = lookup(var);
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.linking
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.diagram.wrap_width == 0 {
            return Err(ConfigError::Invalid("diagram.wrap_width must be at least 1".to_string()));
        }
        if self.extraction.max_context_chars == 0 || self.extraction.full_text_cap == 0 {
            return Err(ConfigError::Invalid("extraction limits must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.linking.similarity_threshold, 0.85);
        assert_eq!(config.linking.top_k, 10);
        assert_eq!(config.diagram.wrap_width, 20);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.embedding.provider, LLMProvider::Ollama);
        assert_eq!(config.extraction.max_context_chars, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml_str(
            "linking:\n  similarity_threshold: 0.7\nllm:\n  provider: gemini\n  model: gemini-1.5-flash\n",
        )
        .unwrap();
        assert_eq!(config.linking.similarity_threshold, 0.7);
        assert_eq!(config.linking.top_k, 10);
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_empty_yaml() {
        let config = AppConfig::from_yaml_str("   \n").unwrap();
        assert_eq!(config.server.address, "0.0.0.0");
    }

    #[test]
    fn test_env_fills_missing_keys_only() {
        let mut config = AppConfig::default();
        config.llm.provider = LLMProvider::OpenAI;
        config.embedding.provider = LLMProvider::Gemini;
        config.embedding.api_key = Some("from-file".to_string());

        config.apply_env(|key| Some(format!("env-{}", key)));

        assert_eq!(config.llm.api_key.as_deref(), Some("env-OPENAI_API_KEY"));
        assert_eq!(config.embedding.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = AppConfig::from_yaml_str("linking:\n  similarity_threshold: 1.5\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9100\ndiagram:\n  wrap_width: 30").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.diagram.wrap_width, 30);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
