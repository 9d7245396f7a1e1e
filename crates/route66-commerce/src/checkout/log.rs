//! Flat JSON transaction log.
//!
//! The whole log is one JSON array, rewritten on every append. Writes go to
//! a sibling temp file that is renamed over the log, so a crash mid-write
//! leaves the previous log intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use route66_storage::StorageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checkout::OrderConfirmation;

/// One confirmed order as written to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub order_number: String,
    pub received_at: DateTime<Utc>,
    pub items: Vec<Value>,
}

impl TransactionRecord {
    pub fn new(confirmation: &OrderConfirmation, items: Vec<Value>) -> Self {
        Self {
            order_number: confirmation.order_number.clone(),
            received_at: confirmation.received_at,
            items,
        }
    }
}

/// Append-only log of confirmed orders.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    path: PathBuf,
}

impl TransactionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record, oldest first. A missing file is an empty log.
    pub fn entries(&self) -> Result<Vec<TransactionRecord>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a record. An unreadable existing log is an error rather than
    /// being overwritten.
    pub fn append(&self, record: TransactionRecord) -> Result<(), StorageError> {
        let mut entries = self.entries()?;
        entries.push(record);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&entries)?)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), count = entries.len(), "transaction log updated");
        Ok(())
    }

    /// Append, logging instead of failing.
    pub fn record(&self, record: TransactionRecord) {
        let order_number = record.order_number.clone();
        if let Err(e) = self.append(record) {
            tracing::warn!(
                order_number = %order_number,
                path = %self.path.display(),
                error = %e,
                "failed to write transaction log"
            );
        }
    }
}
