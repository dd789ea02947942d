//! Mutasi Core Library
//!
//! Shared functionality for the Mutasi bank statement extractor:
//! - Text extraction from PDF, CSV and spreadsheet statements
//! - Prompt rendering for the structured-extraction call
//! - Pluggable AI backends (OpenAI-compatible, mock)
//! - Normalization of raw model output into canonical results
//! - The end-to-end extraction pipeline

pub mod ai;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompts;

/// Test utilities including a mock chat-completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OpenAICompatibleBackend};
pub use error::{Error, Result};
pub use extract::{detect_format, extract_text, FileFormat};
pub use models::{BankStats, ExtractionResult, ExtractionSummary, Transaction, TransactionType};
pub use normalize::{normalize, RawExtraction, RawTransaction};
pub use pipeline::run_extraction;
pub use prompts::build_prompt;
