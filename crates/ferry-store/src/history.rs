//! Ingest history ledger (`history.json`).
//!
//! Entries are prepended, most recent first, and the whole file is rewritten
//! on every append. There is no single-entry delete; `clear` is the only way
//! to drop records.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::io::{read_document_opt, write_json_atomic};

/// Outcome of one ingest attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Success,
    Failed,
}

impl std::fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Immutable audit record. `error_message` is set iff `status` is `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: String,
    pub bundle_name: String,
    pub source_repo: String,
    pub target_repo: String,
    pub profile: String,
    pub status: HistoryStatus,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub artifacts_count: u64,
    #[serde(default)]
    pub duration_seconds: f64,
}

/// Identity of an attempt, known before its outcome.
#[derive(Debug, Clone, Default)]
pub struct IngestAttempt {
    pub bundle_name: String,
    pub source_repo: String,
    pub target_repo: String,
    pub profile: String,
}

impl IngestAttempt {
    pub fn succeeded(self, artifacts_count: u64, elapsed: Duration) -> HistoryEntry {
        self.into_entry(HistoryStatus::Success, None, artifacts_count, elapsed)
    }

    pub fn failed(self, error: &str, artifacts_count: u64, elapsed: Duration) -> HistoryEntry {
        let message = if error.trim().is_empty() {
            "unknown error".to_string()
        } else {
            error.to_string()
        };
        self.into_entry(HistoryStatus::Failed, Some(message), artifacts_count, elapsed)
    }

    fn into_entry(
        self,
        status: HistoryStatus,
        error_message: Option<String>,
        artifacts_count: u64,
        elapsed: Duration,
    ) -> HistoryEntry {
        HistoryEntry {
            id: new_entry_id(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            bundle_name: self.bundle_name,
            source_repo: self.source_repo,
            target_repo: self.target_repo,
            profile: self.profile,
            status,
            error_message,
            artifacts_count,
            duration_seconds: (elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}

/// 12 hex characters from a random UUID.
fn new_entry_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDoc {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
}

/// File-backed ledger.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    path: PathBuf,
}

impl HistoryLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<HistoryDoc> {
        Ok(read_document_opt(&self.path)?.unwrap_or_default())
    }

    /// Prepend `entry` and rewrite the ledger.
    pub fn append(&self, entry: HistoryEntry) -> StoreResult<()> {
        let mut doc = self.load()?;
        doc.entries.insert(0, entry);
        write_json_atomic(&self.path, &doc)
    }

    /// Most recent first, at most `limit` entries when given.
    pub fn list(&self, limit: Option<usize>) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries = self.load()?.entries;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<HistoryEntry>> {
        Ok(self.load()?.entries.into_iter().find(|e| e.id == id))
    }

    /// Drop every entry.
    pub fn clear(&self) -> StoreResult<()> {
        write_json_atomic(&self.path, &HistoryDoc::default())
    }
}
