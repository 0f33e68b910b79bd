//! Concept-tree generation through a chat model

use super::{parse_concept_tree, ConceptNode, TreeError, TreeResult};
use crate::config::{LLMProvider, LlmConfig};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default instruction sent as the system prompt
pub const CONCEPT_TREE_PROMPT: &str = "You are a scientific analyst. Your task is to convert the provided research paper text \
into a structured JSON tree of concepts. \n\
Level 1: Main Method or Topic\n\
Level 2: Sub-components, algorithms, or theories\n\
Level 3: Key details, parameters, or specific findings.\n\n\
The output must be a valid JSON object matching this structure:\n\
{\n\
  \"id\": \"unique_id\",\n\
  \"label\": \"Concept Name\",\n\
  \"summary\": \"Brief summary of the concept\",\n\
  \"children\": [\n\
    { ... sub-concepts ... }\n\
  ]\n\
}\n\
Only output the JSON. Do not include any markdown formatting or explanation.";

/// Turns paper text into a validated concept tree
#[async_trait]
pub trait TreeGenerator: Send + Sync {
    async fn generate(&self, text: &str) -> TreeResult<ConceptNode>;
}

/// Tree generator backed by a chat-completion API
pub struct LlmTreeGenerator {
    client: Client,
    config: LlmConfig,
    api_base_url: String,
}

impl LlmTreeGenerator {
    pub fn new(config: &LlmConfig) -> TreeResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TreeError::ConfigError(e.to_string()))?;

        let api_base_url = config
            .api_base_url
            .clone()
            .unwrap_or_else(|| config.provider.default_base_url().to_string());

        Ok(Self {
            client,
            config: config.clone(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn system_prompt(&self) -> &str {
        self.config.system_prompt.as_deref().unwrap_or(CONCEPT_TREE_PROMPT)
    }

    fn user_prompt(text: &str) -> String {
        format!("Extracted text: \n\n{}", text)
    }

    async fn complete(&self, text: &str) -> TreeResult<String> {
        match self.config.provider {
            LLMProvider::OpenAI => self.openai_chat(text).await,
            LLMProvider::Ollama => self.ollama_chat(text).await,
            LLMProvider::Gemini => self.gemini_chat(text).await,
        }
    }

    async fn openai_chat(&self, text: &str) -> TreeResult<String> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: String,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Response {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MessageContent,
        }

        #[derive(Deserialize)]
        struct MessageContent {
            content: Option<String>,
        }

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| TreeError::ConfigError("OpenAI requires API key".to_string()))?;

        let url = format!("{}/chat/completions", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&Request {
                model: &self.config.model,
                messages: vec![
                    Message { role: "system", content: self.system_prompt().to_string() },
                    Message { role: "user", content: Self::user_prompt(text) },
                ],
                temperature: self.config.temperature,
            })
            .send()
            .await
            .map_err(|e| TreeError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(TreeError::ApiError(format!("OpenAI returned error: {}", error_text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| TreeError::SerializationError(e.to_string()))?;
        Ok(result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn ollama_chat(&self, text: &str) -> TreeResult<String> {
        #[derive(Serialize)]
        struct Options {
            temperature: f32,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            prompt: String,
            system: &'a str,
            stream: bool,
            format: &'a str,
            options: Options,
        }

        #[derive(Deserialize)]
        struct Response {
            response: String,
        }

        let url = format!("{}/api/generate", self.api_base_url);
        let resp = self
            .client
            .post(&url)
            .json(&Request {
                model: &self.config.model,
                prompt: Self::user_prompt(text),
                system: self.system_prompt(),
                stream: false,
                format: "json",
                options: Options { temperature: self.config.temperature },
            })
            .send()
            .await
            .map_err(|e| TreeError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(TreeError::ApiError(format!("Ollama error: {}", resp.status())));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| TreeError::SerializationError(e.to_string()))?;
        Ok(result.response)
    }

    async fn gemini_chat(&self, text: &str) -> TreeResult<String> {
        #[derive(Serialize)]
        struct Request {
            contents: Vec<Content>,
            #[serde(rename = "systemInstruction")]
            system_instruction: Content,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize, Deserialize)]
        struct Content {
            #[serde(skip_serializing_if = "Option::is_none")]
            role: Option<String>,
            parts: Vec<Part>,
        }

        #[derive(Serialize, Deserialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            temperature: f32,
            #[serde(rename = "responseMimeType")]
            response_mime_type: &'static str,
        }

        #[derive(Deserialize)]
        struct Response {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Content,
        }

        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| TreeError::ConfigError("Gemini requires API key".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base_url, self.config.model, api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&Request {
                contents: vec![Content {
                    role: Some("user".to_string()),
                    parts: vec![Part { text: Self::user_prompt(text) }],
                }],
                system_instruction: Content {
                    role: None,
                    parts: vec![Part { text: self.system_prompt().to_string() }],
                },
                generation_config: GenerationConfig {
                    temperature: self.config.temperature,
                    response_mime_type: "application/json",
                },
            })
            .send()
            .await
            .map_err(|e| TreeError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(TreeError::ApiError(format!("Gemini error: {}", text)));
        }

        let result: Response = resp
            .json()
            .await
            .map_err(|e| TreeError::SerializationError(e.to_string()))?;

        Ok(result
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl TreeGenerator for LlmTreeGenerator {
    async fn generate(&self, text: &str) -> TreeResult<ConceptNode> {
        let raw = self.complete(text).await?;
        debug!(model = %self.config.model, bytes = raw.len(), "model response received");

        parse_concept_tree(&raw).map_err(|e| {
            if let Some(payload) = e.raw_payload() {
                warn!("Rejected concept tree: {} (raw response: {})", e, payload);
            }
            e
        })
    }
}
