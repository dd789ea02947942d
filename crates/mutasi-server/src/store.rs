//! In-memory extraction records
//!
//! Every accepted upload gets a record that moves from `processing` to
//! `completed` or `failed`. Records live for a fixed TTL from creation and are
//! swept whenever a new one is inserted; nothing survives a restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use mutasi_core::ExtractionResult;

/// How long records are kept by default (1 hour)
pub const DEFAULT_RECORD_TTL: Duration = Duration::from_secs(60 * 60);

/// Lifecycle state of an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Processing,
    Completed,
    Failed,
}

/// A stored extraction, as returned by `GET /api/extraction/:id`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub id: String,
    pub status: ExtractionStatus,
    pub file_name: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug)]
struct Entry {
    created_at: Instant,
    record: ExtractionRecord,
}

impl Entry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// TTL-bounded record store shared by the upload handlers
#[derive(Debug)]
pub struct ExtractionStore {
    records: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
    counter: AtomicU64,
}

impl Default for ExtractionStore {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_TTL)
    }
}

impl ExtractionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
            counter: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_le_bytes());
        hasher.update(seq.to_le_bytes());
        let hash = hex::encode(hasher.finalize());
        format!("ext_{}", &hash[..24])
    }

    /// Create a `processing` record and return its id
    pub async fn begin(&self, file_name: &str) -> String {
        let id = self.next_id();
        let record = ExtractionRecord {
            id: id.clone(),
            status: ExtractionStatus::Processing,
            file_name: file_name.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            processing_time_ms: None,
            result: None,
            error: None,
        };

        let mut records = self.records.write().await;

        let before = records.len();
        records.retain(|_, e| !e.is_expired(self.ttl));
        let swept = before - records.len();
        if swept > 0 {
            debug!(swept, "Dropped expired extraction records");
        }

        records.insert(
            id.clone(),
            Entry {
                created_at: Instant::now(),
                record,
            },
        );
        id
    }

    /// Mark a record completed
    pub async fn complete(&self, id: &str, result: ExtractionResult, processing_time_ms: u64) {
        let mut records = self.records.write().await;
        if let Some(entry) = records.get_mut(id) {
            let record = &mut entry.record;
            record.status = ExtractionStatus::Completed;
            record.completed_at = Some(Utc::now());
            record.processing_time_ms = Some(processing_time_ms);
            record.result = Some(result);
        }
    }

    /// Mark a record failed
    pub async fn fail(&self, id: &str, error: String, processing_time_ms: u64) {
        let mut records = self.records.write().await;
        if let Some(entry) = records.get_mut(id) {
            let record = &mut entry.record;
            record.status = ExtractionStatus::Failed;
            record.completed_at = Some(Utc::now());
            record.processing_time_ms = Some(processing_time_ms);
            record.error = Some(error);
        }
    }

    /// Look up a record (None if unknown or expired)
    pub async fn get(&self, id: &str) -> Option<ExtractionRecord> {
        let records = self.records.read().await;
        records
            .get(id)
            .filter(|e| !e.is_expired(self.ttl))
            .map(|e| e.record.clone())
    }

    /// Number of records held, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
