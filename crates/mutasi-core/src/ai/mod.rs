//! Pluggable AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the structured
//! extraction call.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let raw = client.extract_transactions(&text, "statement.pdf").await?;
//!     let result = mutasi_core::normalize(&raw);
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_API_KEY`: API key (sent as a bearer token when set)

mod mock;
mod openai_compatible;
pub mod parsing;

pub use mock::MockBackend;
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_BASE_URL, DEFAULT_MODEL};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Ask the model for the transactions in a statement's text
    ///
    /// Returns the model's JSON as-is; run it through
    /// [`normalize`](crate::normalize::normalize) before use. Every failure is
    /// reported as [`Error::ExtractionFailed`](crate::Error::ExtractionFailed).
    async fn extract_transactions(&self, text: &str, file_name: &str) -> Result<Value>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat completions API or any compatible server
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): Uses OPENAI_BASE_URL, OPENAI_MODEL and OPENAI_API_KEY
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create an OpenAI-compatible backend directly
    pub fn openai(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        let backend = match api_key {
            Some(key) => OpenAICompatibleBackend::with_api_key(base_url, model, key),
            None => OpenAICompatibleBackend::new(base_url, model),
        };
        AIClient::OpenAICompatible(backend)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    ///
    /// Used for runtime model override (e.g., `--model` on the CLI)
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn extract_transactions(&self, text: &str, file_name: &str) -> Result<Value> {
        match self {
            AIClient::OpenAICompatible(b) => b.extract_transactions(text, file_name).await,
            AIClient::Mock(b) => b.extract_transactions(text, file_name).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
