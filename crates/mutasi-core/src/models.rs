//! Domain models for Mutasi
//!
//! Field names serialize in camelCase so results can be handed straight to the
//! dashboard frontend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of money movement from the account holder's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money in
    Credit,
    /// Money out
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "Credit",
            Self::Debit => "Debit",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single normalized transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// 1-based position within the result
    pub no: usize,
    pub bank: String,
    /// Always non-negative; the sign lives in `kind`
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: NaiveDate,
    pub description: String,
}

/// Per-bank aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStats {
    pub name: String,
    pub tx_count: usize,
    pub credit_amount: f64,
    pub debit_amount: f64,
}

impl BankStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tx_count: 0,
            credit_amount: 0.0,
            debit_amount: 0.0,
        }
    }
}

/// Aggregate statistics over an extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub total_transactions: usize,
    pub total_credit: f64,
    pub total_debit: f64,
    pub net_amount: f64,
    pub last_uploaded: DateTime<Utc>,
    /// Ordered by first appearance in the transaction list
    pub banks: Vec<BankStats>,
}

impl ExtractionSummary {
    /// Compute the summary in a single pass over `transactions`
    pub fn from_transactions(transactions: &[Transaction], now: DateTime<Utc>) -> Self {
        let mut total_credit = 0.0;
        let mut total_debit = 0.0;
        let mut banks: Vec<BankStats> = Vec::new();

        for tx in transactions {
            // Linear lookup keeps first-seen order; a statement has a handful of banks at most
            let idx = match banks.iter().position(|b| b.name == tx.bank) {
                Some(idx) => idx,
                None => {
                    banks.push(BankStats::new(&tx.bank));
                    banks.len() - 1
                }
            };
            let stats = &mut banks[idx];
            stats.tx_count += 1;

            match tx.kind {
                TransactionType::Credit => {
                    total_credit += tx.amount;
                    stats.credit_amount += tx.amount;
                }
                TransactionType::Debit => {
                    total_debit += tx.amount;
                    stats.debit_amount += tx.amount;
                }
            }
        }

        Self {
            total_transactions: transactions.len(),
            total_credit,
            total_debit,
            net_amount: total_credit - total_debit,
            last_uploaded: now,
            banks,
        }
    }
}

/// The complete output of one extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub summary: ExtractionSummary,
    pub transactions: Vec<Transaction>,
}
