//! Integration tests for mutasi-core
//!
//! These tests exercise the full upload buffer → text → chat completion →
//! normalized result workflow against a local mock chat-completion server.

use chrono::NaiveDate;
use mutasi_core::{
    run_extraction,
    test_utils::{MockChatServer, MockReply},
    AIClient, Error, TransactionType,
};
use serde_json::json;

/// A short BCA e-statement export
fn bca_csv() -> &'static str {
    "Tanggal,Keterangan,Cabang,Jumlah,Saldo\n\
     05/01/2024,TRSF E-BANKING CR GAJI JANUARI,0000,\"5,000,000.00 CR\",\"7,500,000.00\"\n\
     06/01/2024,TARIKAN ATM 06/01,0998,\"500,000.00 DB\",\"7,000,000.00\"\n\
     07/01/2024,KARTU DEBIT INDOMARET,0000,\"125,500.00 DB\",\"6,874,500.00\"\n"
}

fn bca_reply() -> serde_json::Value {
    json!({
        "bank": "BCA",
        "transactions": [
            {"amount": 5000000, "type": "Credit", "date": "2024-01-05", "description": "TRSF E-BANKING CR GAJI JANUARI"},
            {"amount": 500000, "type": "Debit", "date": "2024-01-06", "description": "TARIKAN ATM 06/01"},
            {"amount": "125500.00", "type": "Debit", "date": "2024-01-07", "description": "KARTU DEBIT INDOMARET"}
        ]
    })
}

// =============================================================================
// Full Pipeline
// =============================================================================

#[tokio::test]
async fn test_csv_statement_end_to_end() {
    let server = MockChatServer::start(MockReply::json(bca_reply())).await;
    let ai = AIClient::openai(&server.url(), "gpt-4o-mini", Some("sk-test"));

    let result = run_extraction(&ai, bca_csv().as_bytes(), "bca_jan.csv", Some("text/csv"))
        .await
        .expect("pipeline should succeed");

    assert_eq!(result.transactions.len(), 3);
    let numbers: Vec<usize> = result.transactions.iter().map(|t| t.no).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(result.transactions.iter().all(|t| t.bank == "BCA"));
    assert_eq!(result.transactions[2].amount, 125500.0);
    assert_eq!(
        result.transactions[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    );

    let summary = &result.summary;
    assert_eq!(summary.total_transactions, 3);
    assert_eq!(summary.total_credit, 5_000_000.0);
    assert_eq!(summary.total_debit, 625_500.0);
    assert_eq!(summary.net_amount, 4_374_500.0);
    assert_eq!(summary.banks.len(), 1);
    assert_eq!(summary.banks[0].tx_count, 3);

    // The model saw the rendered table, not the raw CSV
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let user_prompt = requests[0].body["messages"][1]["content"]
        .as_str()
        .unwrap();
    assert!(user_prompt.contains("[File name: bca_jan.csv]"));
    assert!(user_prompt.contains("Tanggal | Keterangan | Cabang | Jumlah | Saldo"));
    assert!(user_prompt.contains(&"-".repeat(50)));
    assert!(user_prompt.contains("5,000,000.00 CR"));
    assert_eq!(requests[0].body["response_format"]["type"], "json_object");
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Bearer sk-test")
    );
}

#[tokio::test]
async fn test_sloppy_model_output_is_normalized() {
    let server = MockChatServer::start(MockReply::json(json!({
        "bank": "   ",
        "transactions": [
            {"amount": -20000, "type": "credit", "date": "not a date", "description": "Refund"},
            {"amount": "abc", "type": "Credit", "date": "2024-02-01"},
            "garbage"
        ]
    })))
    .await;
    let ai = AIClient::openai(&server.url(), "gpt-4o-mini", None);

    let result = run_extraction(&ai, bca_csv().as_bytes(), "statement.csv", None)
        .await
        .unwrap();

    assert_eq!(result.transactions.len(), 3);
    assert!(result.transactions.iter().all(|t| t.bank == "Unknown Bank"));

    // Lowercase "credit" is not Credit; magnitude is taken from the negative number
    assert_eq!(result.transactions[0].kind, TransactionType::Debit);
    assert_eq!(result.transactions[0].amount, 20000.0);

    assert_eq!(result.transactions[1].kind, TransactionType::Credit);
    assert_eq!(result.transactions[1].amount, 0.0);
    assert_eq!(result.transactions[1].description, "");

    assert_eq!(result.summary.total_credit, 0.0);
    assert_eq!(result.summary.total_debit, 20000.0);
    assert_eq!(result.summary.banks[0].name, "Unknown Bank");
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_unsupported_file_never_reaches_model() {
    let server = MockChatServer::start(MockReply::json(bca_reply())).await;
    let ai = AIClient::openai(&server.url(), "gpt-4o-mini", None);

    let err = run_extraction(&ai, b"PK\x03\x04", "archive.zip", Some("application/zip"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnsupportedFormat(_)));
    assert!(err.is_client_error());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_blank_csv_never_reaches_model() {
    let server = MockChatServer::start(MockReply::json(bca_reply())).await;
    let ai = AIClient::openai(&server.url(), "gpt-4o-mini", None);

    let err = run_extraction(&ai, b"", "empty.csv", Some("text/csv"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyContent));
    assert_eq!(
        err.to_string(),
        "Could not extract any text from the file. Please ensure the file contains readable content."
    );
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_upstream_error_surfaces_as_extraction_failure() {
    let server = MockChatServer::start(MockReply::Status(
        500,
        r#"{"error":{"message":"upstream exploded"}}"#.to_string(),
    ))
    .await;
    let ai = AIClient::openai(&server.url(), "gpt-4o-mini", None);

    let err = run_extraction(&ai, bca_csv().as_bytes(), "bca.csv", None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ExtractionFailed(_)));
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_non_json_reply_surfaces_as_extraction_failure() {
    let server = MockChatServer::start(MockReply::content(
        "Sure! Here are the transactions you asked for.",
    ))
    .await;
    let ai = AIClient::openai(&server.url(), "gpt-4o-mini", None);

    let err = run_extraction(&ai, bca_csv().as_bytes(), "bca.csv", None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid JSON from model"));
}
