//! Statement extraction commands

use std::path::Path;

use anyhow::{Context, Result};
use mutasi_core::{
    extract_text, run_extraction, AIBackend, AIClient, ExtractionResult, TransactionType,
};
use tracing::debug;

use super::truncate;

/// A statement file read from disk
#[derive(Debug)]
pub struct StatementFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Read a statement file, keeping only its base name for format detection
pub fn load_statement(path: &Path) -> Result<StatementFile> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(StatementFile { file_name, data })
}

/// Extract transactions from a statement using the configured AI backend
pub async fn cmd_extract(
    path: &Path,
    mime: Option<&str>,
    model: Option<&str>,
    json: bool,
) -> Result<()> {
    let ai = AIClient::from_env().context(
        "AI backend not configured. Set OPENAI_API_KEY (or AI_BACKEND=mock for a dry run)",
    )?;
    let ai = match model {
        Some(m) => ai.with_model(m),
        None => ai,
    };

    cmd_extract_with_client(&ai, path, mime, json).await
}

/// Extraction with an explicit client - separated for testability
pub async fn cmd_extract_with_client(
    ai: &AIClient,
    path: &Path,
    mime: Option<&str>,
    json: bool,
) -> Result<()> {
    let statement = load_statement(path)?;
    debug!(
        file_name = %statement.file_name,
        size = statement.data.len(),
        model = ai.model(),
        "Extracting statement"
    );

    if !json {
        println!("📄 Extracting {} ...", statement.file_name);
    }

    let result = run_extraction(ai, &statement.data, &statement.file_name, mime)
        .await
        .with_context(|| format!("Extraction failed for {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

/// Print the text the model would receive
pub fn cmd_text(path: &Path, mime: Option<&str>) -> Result<()> {
    let statement = load_statement(path)?;
    let text = extract_text(&statement.data, &statement.file_name, mime)?;

    if text.trim().is_empty() {
        println!("⚠️  No text could be extracted from {}", statement.file_name);
        return Ok(());
    }

    println!("{}", text);
    Ok(())
}

fn print_result(result: &ExtractionResult) {
    let summary = &result.summary;

    println!();
    println!("💳 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    if result.transactions.is_empty() {
        println!("   No transactions found.");
    }

    for tx in &result.transactions {
        let amount_str = match tx.kind {
            TransactionType::Debit => format!("\x1b[31m-{:.2}\x1b[0m", tx.amount), // Red for outflows
            TransactionType::Credit => format!("\x1b[32m+{:.2}\x1b[0m", tx.amount), // Green for inflows
        };

        println!(
            "   {:>3} │ {} │ {:>16} │ {}",
            tx.no,
            tx.date,
            amount_str,
            truncate(&tx.description, 40)
        );
    }

    println!();
    println!("📊 Summary");
    println!("   Transactions: {}", summary.total_transactions);
    println!("   Credit:       {:.2}", summary.total_credit);
    println!("   Debit:        {:.2}", summary.total_debit);
    println!("   Net:          {:.2}", summary.net_amount);

    for bank in &summary.banks {
        println!(
            "   🏦 {} - {} transactions (credit {:.2}, debit {:.2})",
            bank.name, bank.tx_count, bank.credit_amount, bank.debit_amount
        );
    }
}
