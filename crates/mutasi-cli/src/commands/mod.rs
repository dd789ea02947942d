//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `extract` - Statement commands (extract, text) and file loading
//! - `check` - AI backend configuration check
//! - `serve` - Web server command

pub mod check;
pub mod extract;
pub mod serve;

// Re-export command functions for main.rs
pub use check::*;
pub use extract::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
