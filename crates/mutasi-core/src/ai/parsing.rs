//! JSON parsing for model responses
//!
//! The request asks for a strict JSON object, so the content is parsed once as-is.
//! Fenced or prose-wrapped output is treated as a failure, not repaired.

use serde_json::Value;

use crate::error::{Error, Result};

/// Longest slice of raw model output quoted in an error message
const RAW_PREVIEW_CHARS: usize = 200;

fn preview(content: &str) -> String {
    match content.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}

/// Parse the message content of a chat completion
pub fn parse_extraction_response(content: Option<&str>) -> Result<Value> {
    let content = content.map(str::trim).unwrap_or("");
    if content.is_empty() {
        return Err(Error::ExtractionFailed("No response from model".into()));
    }

    serde_json::from_str(content).map_err(|e| {
        Error::ExtractionFailed(format!(
            "Invalid JSON from model: {} | Raw: {}",
            e,
            preview(content)
        ))
    })
}
