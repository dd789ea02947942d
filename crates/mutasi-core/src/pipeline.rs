//! End-to-end extraction for one uploaded statement
//!
//! buffer → text → (reject blank) → model → normalize. Stateless; each call
//! works on its own buffer and returns its own result.

use std::time::Instant;

use tracing::{debug, info};

use crate::ai::AIBackend;
use crate::error::{Error, Result};
use crate::extract::extract_text;
use crate::models::ExtractionResult;
use crate::normalize::normalize;

/// Run the full pipeline over a statement buffer
pub async fn run_extraction<B>(
    ai: &B,
    buffer: &[u8],
    file_name: &str,
    mime: Option<&str>,
) -> Result<ExtractionResult>
where
    B: AIBackend + ?Sized,
{
    let started = Instant::now();

    let text = extract_text(buffer, file_name, mime)?;
    if text.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    info!(file_name, chars = text.chars().count(), "File parsed");

    debug!(model = ai.model(), host = ai.host(), "Calling AI backend");
    let raw = ai.extract_transactions(&text, file_name).await?;

    let result = normalize(&raw);
    info!(
        file_name,
        transactions = result.summary.total_transactions,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Extraction complete"
    );

    Ok(result)
}
