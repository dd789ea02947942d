//! Normalization of raw model output
//!
//! The model's JSON is decoded at exactly one boundary, [`RawExtraction::from_value`],
//! using the explicit coercion functions below. Everything after that works on
//! typed values. Normalization is total: any JSON value produces a well-formed
//! [`ExtractionResult`].
//!
//! Policies worth knowing about:
//! - The whole document gets one bank name. Per-row bank hints from the model are
//!   ignored.
//! - Any `type` other than the exact string `"Credit"` is treated as a debit.
//! - Missing or unreadable dates become today's date (UTC).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::{ExtractionResult, ExtractionSummary, Transaction, TransactionType};

/// Bank name used when the model could not identify one
pub const UNKNOWN_BANK: &str = "Unknown Bank";

/// Date formats accepted from the model, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-01-05
    "%d/%m/%y", // 05/01/24 (must precede %Y, which would read "24" as year 24)
    "%d/%m/%Y", // 05/01/2024 (Indonesian statements)
    "%d-%m-%Y", // 05-01-2024
    "%Y/%m/%d", // 2024/01/05
    "%d %b %Y", // 05 Jan 2024
    "%d %B %Y", // 05 January 2024
];

/// Local timestamps without an offset; the time of day is dropped
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Width of a leading `YYYY-MM-DD`
const ISO_DATE_LEN: usize = 10;

/// Coerce an amount to a non-negative number
///
/// - JSON number: absolute value
/// - string holding a plain number (surrounding whitespace allowed): absolute value
/// - anything else (missing, null, bool, formatted strings like "1.500,00",
///   arrays, objects), NaN or infinity: 0
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };

    if n.is_finite() {
        n.abs()
    } else {
        0.0
    }
}

/// Coerce a transaction type
///
/// Only the exact string `"Credit"` is a credit. Everything else, including
/// `"credit"`, `"CR"` and missing values, is a debit.
pub fn coerce_type(value: Option<&Value>) -> TransactionType {
    match value {
        Some(Value::String(s)) if s == "Credit" => TransactionType::Credit,
        _ => TransactionType::Debit,
    }
}

/// Coerce a date string, returning `None` when it is missing or unreadable
pub fn coerce_date(value: Option<&Value>) -> Option<NaiveDate> {
    let s = match value {
        Some(Value::String(s)) => s.trim(),
        _ => return None,
    };
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // Full timestamps ("2024-01-05T10:00:00Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Anything else that starts with an ISO date ("2024-01-05 (posted)")
    s.get(..ISO_DATE_LEN)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Coerce a free-text field; non-strings become `None`
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// A transaction as decoded from model output, before numbering
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    pub amount: f64,
    pub kind: TransactionType,
    pub date: Option<NaiveDate>,
    pub description: String,
}

impl RawTransaction {
    /// Decode one entry; non-objects decode as an entry with no fields
    pub fn from_value(value: &Value) -> Self {
        Self {
            amount: coerce_amount(value.get("amount")),
            kind: coerce_type(value.get("type")),
            date: coerce_date(value.get("date")),
            description: coerce_text(value.get("description")).unwrap_or_default(),
        }
    }
}

/// Typed view of the model's response
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtraction {
    /// Detected bank, `None` when missing or blank
    pub bank: Option<String>,
    pub transactions: Vec<RawTransaction>,
}

impl RawExtraction {
    /// Decode any JSON value. Never fails.
    pub fn from_value(raw: &Value) -> Self {
        let bank = coerce_text(raw.get("bank")).filter(|b| !b.trim().is_empty());

        let transactions = match raw.get("transactions") {
            Some(Value::Array(entries)) => entries.iter().map(RawTransaction::from_value).collect(),
            _ => Vec::new(),
        };

        Self { bank, transactions }
    }
}

/// Normalize raw model output into a canonical result, stamped with the current time
pub fn normalize(raw: &Value) -> ExtractionResult {
    normalize_at(raw, Utc::now())
}

/// Normalize with an explicit clock
///
/// `now` becomes `lastUploaded`, and its UTC date fills in missing transaction dates.
pub fn normalize_at(raw: &Value, now: DateTime<Utc>) -> ExtractionResult {
    let decoded = RawExtraction::from_value(raw);
    let bank = decoded.bank.unwrap_or_else(|| UNKNOWN_BANK.to_string());
    let today = now.date_naive();

    let transactions: Vec<Transaction> = decoded
        .transactions
        .into_iter()
        .enumerate()
        .map(|(idx, tx)| Transaction {
            no: idx + 1,
            bank: bank.clone(),
            amount: tx.amount,
            kind: tx.kind,
            date: tx.date.unwrap_or(today),
            description: tx.description,
        })
        .collect();

    let summary = ExtractionSummary::from_transactions(&transactions, now);

    ExtractionResult {
        summary,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bca_scenario() {
        let raw = json!({
            "bank": "BCA",
            "transactions": [
                {"amount": "150000", "type": "Credit", "date": "2024-01-05", "description": "Salary"},
                {"amount": -75000, "type": "Debit"}
            ]
        });

        let result = normalize_at(&raw, fixed_now());

        assert_eq!(
            result.transactions,
            vec![
                Transaction {
                    no: 1,
                    bank: "BCA".into(),
                    amount: 150000.0,
                    kind: TransactionType::Credit,
                    date: ymd(2024, 1, 5),
                    description: "Salary".into(),
                },
                Transaction {
                    no: 2,
                    bank: "BCA".into(),
                    amount: 75000.0,
                    kind: TransactionType::Debit,
                    date: ymd(2024, 3, 1),
                    description: String::new(),
                },
            ]
        );

        let summary = &result.summary;
        assert_eq!(summary.total_transactions, 2);
        assert_eq!(summary.total_credit, 150000.0);
        assert_eq!(summary.total_debit, 75000.0);
        assert_eq!(summary.net_amount, 75000.0);
        assert_eq!(summary.last_uploaded, fixed_now());
        assert_eq!(summary.banks.len(), 1);
        assert_eq!(summary.banks[0].name, "BCA");
        assert_eq!(summary.banks[0].tx_count, 2);
        assert_eq!(summary.banks[0].credit_amount, 150000.0);
        assert_eq!(summary.banks[0].debit_amount, 75000.0);
    }

    #[test]
    fn test_empty_object() {
        let result = normalize_at(&json!({}), fixed_now());
        assert!(result.transactions.is_empty());
        assert_eq!(result.summary.total_transactions, 0);
        assert_eq!(result.summary.total_credit, 0.0);
        assert_eq!(result.summary.total_debit, 0.0);
        assert_eq!(result.summary.net_amount, 0.0);
        assert!(result.summary.banks.is_empty());
        assert_eq!(RawExtraction::from_value(&json!({})).bank, None);
    }

    #[test]
    fn test_unknown_bank_fallback() {
        for raw in [
            json!({"transactions": [{"amount": 1}]}),
            json!({"bank": "", "transactions": [{"amount": 1}]}),
            json!({"bank": "   ", "transactions": [{"amount": 1}]}),
            json!({"bank": 42, "transactions": [{"amount": 1}]}),
            json!({"bank": null, "transactions": [{"amount": 1}]}),
        ] {
            let result = normalize_at(&raw, fixed_now());
            assert_eq!(result.transactions[0].bank, UNKNOWN_BANK);
            assert_eq!(result.summary.banks[0].name, UNKNOWN_BANK);
        }
    }

    #[test]
    fn test_single_bank_policy_ignores_row_hints() {
        let raw = json!({
            "bank": "Mandiri",
            "transactions": [
                {"amount": 10, "bank": "BNI"},
                {"amount": 20, "bank": "BRI"}
            ]
        });
        let result = normalize_at(&raw, fixed_now());
        assert!(result.transactions.iter().all(|t| t.bank == "Mandiri"));
        assert_eq!(result.summary.banks.len(), 1);
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(Some(&json!(12.5))), 12.5);
        assert_eq!(coerce_amount(Some(&json!(-12.5))), 12.5);
        assert_eq!(coerce_amount(Some(&json!(" 3000 "))), 3000.0);
        assert_eq!(coerce_amount(Some(&json!("-75000"))), 75000.0);
        assert_eq!(coerce_amount(Some(&json!("Rp 1.500"))), 0.0);
        assert_eq!(coerce_amount(Some(&json!("1,500.00"))), 0.0);
        assert_eq!(coerce_amount(Some(&json!(""))), 0.0);
        assert_eq!(coerce_amount(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_amount(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_amount(Some(&json!(true))), 0.0);
        assert_eq!(coerce_amount(Some(&json!(null))), 0.0);
        assert_eq!(coerce_amount(Some(&json!([1]))), 0.0);
        assert_eq!(coerce_amount(None), 0.0);
    }

    #[test]
    fn test_coerce_type_defaults_to_debit() {
        assert_eq!(coerce_type(Some(&json!("Credit"))), TransactionType::Credit);
        assert_eq!(coerce_type(Some(&json!("Debit"))), TransactionType::Debit);
        assert_eq!(coerce_type(Some(&json!("credit"))), TransactionType::Debit);
        assert_eq!(coerce_type(Some(&json!("CR"))), TransactionType::Debit);
        assert_eq!(coerce_type(Some(&json!(1))), TransactionType::Debit);
        assert_eq!(coerce_type(None), TransactionType::Debit);
    }

    #[test]
    fn test_coerce_date() {
        assert_eq!(coerce_date(Some(&json!("2024-01-05"))), Some(ymd(2024, 1, 5)));
        assert_eq!(coerce_date(Some(&json!("05/01/2024"))), Some(ymd(2024, 1, 5)));
        assert_eq!(coerce_date(Some(&json!("05-01-2024"))), Some(ymd(2024, 1, 5)));
        assert_eq!(coerce_date(Some(&json!("05/01/24"))), Some(ymd(2024, 1, 5)));
        assert_eq!(
            coerce_date(Some(&json!("2024-01-05T23:10:00Z"))),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            coerce_date(Some(&json!("2024-01-05T10:30:00"))),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            coerce_date(Some(&json!("2024-01-05 10:30:00"))),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            coerce_date(Some(&json!("2024-01-05 10:30:00.250"))),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(
            coerce_date(Some(&json!("2024-01-05 (posted 06/01)"))),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(coerce_date(Some(&json!("05 Jan 2024"))), Some(ymd(2024, 1, 5)));
        assert_eq!(
            coerce_date(Some(&json!("05 January 2024"))),
            Some(ymd(2024, 1, 5))
        );
        assert_eq!(coerce_date(Some(&json!("2024-13-45"))), None);
        assert_eq!(coerce_date(Some(&json!("yesterday"))), None);
        assert_eq!(coerce_date(Some(&json!(""))), None);
        assert_eq!(coerce_date(Some(&json!(20240105))), None);
        assert_eq!(coerce_date(None), None);
    }

    #[test]
    fn test_present_datetime_is_kept() {
        let raw = json!({"transactions": [
            {"amount": 1, "date": "2024-01-05 10:30:00"},
            {"amount": 1, "date": "05 Jan 2024"},
            {"amount": 1, "date": "2024-01-05T10:30:00"}
        ]});
        let result = normalize_at(&raw, fixed_now());
        for tx in &result.transactions {
            assert_eq!(tx.date, ymd(2024, 1, 5));
        }
    }

    #[test]
    fn test_unreadable_date_becomes_today() {
        let raw = json!({"bank": "BNI", "transactions": [{"amount": 1, "date": "n/a"}]});
        let result = normalize_at(&raw, fixed_now());
        assert_eq!(result.transactions[0].date, ymd(2024, 3, 1));
    }

    #[test]
    fn test_malformed_shapes_never_fail() {
        let inputs = [
            json!(null),
            json!(42),
            json!("text"),
            json!([1, 2, 3]),
            json!({"transactions": "nope"}),
            json!({"transactions": {"amount": 5}}),
            json!({"transactions": [null, 7, "x", [], {}]}),
            json!({"bank": {"name": "BCA"}, "transactions": [{"amount": {"v": 1}, "type": null, "date": [], "description": 5}]}),
        ];

        for raw in inputs {
            let result = normalize_at(&raw, fixed_now());
            assert_eq!(result.summary.total_transactions, result.transactions.len());
            for tx in &result.transactions {
                assert!(tx.amount >= 0.0);
            }
        }
    }

    #[test]
    fn test_non_object_entries_become_empty_debits() {
        let raw = json!({"bank": "BRI", "transactions": [null, "garbage"]});
        let result = normalize_at(&raw, fixed_now());
        assert_eq!(result.transactions.len(), 2);
        for tx in &result.transactions {
            assert_eq!(tx.amount, 0.0);
            assert_eq!(tx.kind, TransactionType::Debit);
            assert_eq!(tx.date, ymd(2024, 3, 1));
            assert_eq!(tx.description, "");
        }
    }

    #[test]
    fn test_numbering_is_dense() {
        let entries: Vec<Value> = (0..25).map(|i| json!({"amount": i})).collect();
        let raw = json!({"bank": "CIMB", "transactions": entries});
        let result = normalize_at(&raw, fixed_now());

        let numbers: Vec<usize> = result.transactions.iter().map(|t| t.no).collect();
        assert_eq!(numbers, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_totals_match_transactions() {
        let raw = json!({
            "bank": "BNI",
            "transactions": [
                {"amount": 100.25, "type": "Credit"},
                {"amount": 40.5, "type": "Debit"},
                {"amount": "9.25", "type": "weird"},
                {"amount": -3, "type": "Credit"}
            ]
        });
        let result = normalize_at(&raw, fixed_now());
        let summary = &result.summary;

        let credit: f64 = result
            .transactions
            .iter()
            .filter(|t| t.kind == TransactionType::Credit)
            .map(|t| t.amount)
            .sum();
        let debit: f64 = result
            .transactions
            .iter()
            .filter(|t| t.kind == TransactionType::Debit)
            .map(|t| t.amount)
            .sum();

        assert_eq!(summary.total_credit, credit);
        assert_eq!(summary.total_debit, debit);
        assert_eq!(summary.net_amount, summary.total_credit - summary.total_debit);
        assert_eq!(summary.banks[0].tx_count, 4);
        assert_eq!(summary.banks[0].credit_amount, credit);
        assert_eq!(summary.banks[0].debit_amount, debit);
    }
}
