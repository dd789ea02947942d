//! Mock backend for testing
//!
//! Returns a fixed model response without any network access. Useful for unit
//! tests and for running the server without an API key (`AI_BACKEND=mock`).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Error, Result};

use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Raw JSON handed back from every extraction; `None` simulates an empty reply
    pub response: Option<Value>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, with a small sample statement)
    pub fn new() -> Self {
        Self {
            healthy: true,
            response: Some(json!({
                "bank": "BCA",
                "transactions": [
                    {
                        "amount": 150000,
                        "type": "Credit",
                        "date": "2024-01-05",
                        "description": "Salary"
                    },
                    {
                        "amount": 75000,
                        "type": "Debit",
                        "date": "2024-01-06",
                        "description": "Groceries"
                    }
                ]
            })),
        }
    }

    /// Create a mock that always returns `response`
    pub fn with_response(response: Value) -> Self {
        Self {
            healthy: true,
            response: Some(response),
        }
    }

    /// Create a mock whose replies carry no content
    pub fn empty() -> Self {
        Self {
            healthy: true,
            response: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn extract_transactions(&self, _text: &str, _file_name: &str) -> Result<Value> {
        self.response
            .clone()
            .ok_or_else(|| Error::ExtractionFailed("No response from model".into()))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
