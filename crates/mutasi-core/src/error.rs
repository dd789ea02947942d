//! Error types for Mutasi

use thiserror::Error;

use crate::extract::FileFormat;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error(
        "Could not extract any text from the file. Please ensure the file contains readable content."
    )]
    EmptyContent,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// A parsing backend (PDF, CSV or spreadsheet library) rejected the file.
    /// The detail is for logs only; users see the generic message.
    #[error("Failed to parse {format} file")]
    Parse { format: FileFormat, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(format: FileFormat, detail: impl ToString) -> Self {
        Self::Parse {
            format,
            detail: detail.to_string(),
        }
    }

    /// Whether the error was caused by the uploaded file rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::EmptyContent)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
