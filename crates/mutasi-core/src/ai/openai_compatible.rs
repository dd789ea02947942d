//! OpenAI-compatible backend implementation
//!
//! Works with the OpenAI API and any server that implements its chat
//! completions endpoint (vLLM, LocalAI, llama-server, ...).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_API_KEY`: API key if required (optional for local servers)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompts::{build_prompt, SYSTEM_PROMPT};

use super::parsing::parse_extraction_response;
use super::AIBackend;

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model for extraction
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for extraction; kept low for repeatable output
const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// OpenAI-compatible backend
///
/// Sends one `/v1/chat/completions` request per extraction. No retries and no
/// client-side timeout: a hung upstream call hangs the caller.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

/// Accept both "https://host" and "https://host/v1"
fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    trimmed.strip_suffix("/v1").unwrap_or(trimmed).to_string()
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Create from environment variables
    ///
    /// Returns None when neither `OPENAI_API_KEY` nor `OPENAI_BASE_URL` is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());

        if api_key.is_none() && base_url.is_none() {
            return None;
        }

        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut backend = Self::new(&base_url, &model);
        backend.api_key = api_key;
        Some(backend)
    }

    /// Make a JSON-mode chat completion request and return the message content
    async fn chat_completion(&self, system: &str, prompt: &str) -> Result<Option<String>> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(EXTRACTION_TEMPERATURE),
            response_format: Some(ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| Error::ExtractionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ExtractionFailed(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::ExtractionFailed(format!("Unreadable API response: {}", e)))?;

        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Output format constraint (`{"type": "json_object"}`)
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn extract_transactions(&self, text: &str, file_name: &str) -> Result<Value> {
        let prompt = build_prompt(text, file_name);
        debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "Requesting transaction extraction"
        );

        let content = self.chat_completion(SYSTEM_PROMPT, &prompt).await?;
        debug!(
            response_chars = content.as_deref().map(|c| c.len()).unwrap_or(0),
            "Extraction response received"
        );

        parse_extraction_response(content.as_deref())
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
