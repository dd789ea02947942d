//! Mutasi CLI - Bank statement transaction extractor
//!
//! Usage:
//!   mutasi extract statement.pdf     Extract transactions
//!   mutasi text statement.xlsx       Show extracted text
//!   mutasi check                     Check AI backend
//!   mutasi serve --port 3002         Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Extract {
            file,
            mime,
            model,
            json,
        } => commands::cmd_extract(&file, mime.as_deref(), model.as_deref(), json).await,
        Commands::Text { file, mime } => commands::cmd_text(&file, mime.as_deref()),
        Commands::Check => commands::cmd_check().await,
        Commands::Serve {
            port,
            host,
            max_upload_mb,
        } => commands::cmd_serve(&host, port, max_upload_mb).await,
    }
}
