//! Prompt rendering for the structured-extraction call
//!
//! The instruction block is embedded at compile time from `prompts/`; the
//! statement text is appended after a file-name hint and capped at
//! [`MAX_PROMPT_CHARS`] characters.

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const EXTRACT_TRANSACTIONS: &str =
        include_str!("../../../prompts/extract_transactions.md");
}

/// System message sent alongside every extraction prompt
pub const SYSTEM_PROMPT: &str = "You are an expert financial document parser. Always respond with valid JSON only, no markdown formatting or code blocks.";

/// Maximum number of statement characters included in a prompt
pub const MAX_PROMPT_CHARS: usize = 15_000;

/// Marker appended when statement text is cut at [`MAX_PROMPT_CHARS`]
pub const TRUNCATION_MARKER: &str = "[Content truncated due to length...]";

/// Cap `text` at `max_chars` characters, appending the truncation marker if cut
pub fn truncate_content(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}\n\n{}", &text[..byte_idx], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Build the user prompt for a statement
pub fn build_prompt(text: &str, file_name: &str) -> String {
    format!(
        "{}\n\n[File name: {}]\n\n{}",
        defaults::EXTRACT_TRANSACTIONS.trim_end(),
        file_name,
        truncate_content(text, MAX_PROMPT_CHARS)
    )
}
