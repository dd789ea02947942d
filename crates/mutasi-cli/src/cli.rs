//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mutasi - Turn bank statements into structured transactions
#[derive(Parser)]
#[command(name = "mutasi")]
#[command(about = "Bank statement transaction extractor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract transactions from a statement file (PDF, CSV, XLS, XLSX)
    Extract {
        /// Statement file
        file: PathBuf,

        /// MIME type override (detected from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,

        /// Model override (defaults to OPENAI_MODEL)
        #[arg(short, long)]
        model: Option<String>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the text that would be sent to the model (no AI call)
    Text {
        /// Statement file
        file: PathBuf,

        /// MIME type override (detected from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show AI backend configuration and check connectivity
    Check,

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to PORT, then 3002)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Maximum upload size in MB (defaults to MAX_FILE_SIZE_MB, then 5)
        #[arg(long)]
        max_upload_mb: Option<usize>,
    },
}
