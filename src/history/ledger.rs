//! Append-only backup history ledger
//!
//! Entries are written as line-delimited JSON (JSONL), one record per
//! line, flushed immediately. Append is called exactly once per completed
//! backup attempt — success or failure — so the ledger reflects true
//! history including the failures.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::record::{BackupKind, BackupRecord, RecordId};
use crate::error::{BackupError, BackupResult};
use crate::store::file_io::write_bytes_atomic;

/// Filter for listing ledger records
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only records of this kind
    pub kind: Option<BackupKind>,
    /// Only records at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Only records at or before this instant
    pub until: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    fn matches(&self, record: &BackupRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.kind != kind {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.date < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.date > until {
                return false;
            }
        }
        true
    }
}

/// Persistent, append-only record of backup attempts
pub struct BackupHistoryLedger {
    /// Path to the ledger file
    ledger_path: PathBuf,
}

impl BackupHistoryLedger {
    /// Create a ledger backed by the given path
    pub fn new(ledger_path: PathBuf) -> Self {
        Self { ledger_path }
    }

    /// Append a record
    ///
    /// Each write is flushed immediately to ensure durability.
    pub fn append(&self, record: &BackupRecord) -> BackupResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.ledger_path)
            .map_err(|e| BackupError::Ledger(format!("Failed to open ledger: {}", e)))?;

        let json = serde_json::to_string(record)
            .map_err(|e| BackupError::Ledger(format!("Failed to serialize record: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| BackupError::Ledger(format!("Failed to write record: {}", e)))?;

        file.flush()
            .map_err(|e| BackupError::Ledger(format!("Failed to flush ledger: {}", e)))?;

        Ok(())
    }

    /// Read all records in chronological order (oldest first)
    pub fn read_all(&self) -> BackupResult<Vec<BackupRecord>> {
        if !self.ledger_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.ledger_path)
            .map_err(|e| BackupError::Ledger(format!("Failed to open ledger: {}", e)))?;

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                BackupError::Ledger(format!("Failed to read ledger line {}: {}", line_num + 1, e))
            })?;

            // Skip empty lines
            if line.trim().is_empty() {
                continue;
            }

            let record: BackupRecord = serde_json::from_str(&line).map_err(|e| {
                BackupError::Ledger(format!(
                    "Failed to parse record at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// List records matching `filter`, most recent first
    pub fn list(&self, filter: &HistoryFilter) -> BackupResult<Vec<BackupRecord>> {
        let mut records: Vec<BackupRecord> = self
            .read_all()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();

        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    /// Delete the records with the given ids, returning how many were removed
    ///
    /// The surviving records are rewritten atomically.
    pub fn remove(&self, ids: &[RecordId]) -> BackupResult<usize> {
        let ids: HashSet<&RecordId> = ids.iter().collect();
        let records = self.read_all()?;

        let survivors: Vec<&BackupRecord> =
            records.iter().filter(|r| !ids.contains(&r.id)).collect();
        let removed = records.len() - survivors.len();

        if removed == 0 {
            return Ok(0);
        }

        let mut bytes = Vec::new();
        for record in survivors {
            let json = serde_json::to_string(record)
                .map_err(|e| BackupError::Ledger(format!("Failed to serialize record: {}", e)))?;
            bytes.extend_from_slice(json.as_bytes());
            bytes.push(b'\n');
        }

        write_bytes_atomic(&self.ledger_path, &bytes)?;
        Ok(removed)
    }

    /// Delete every record
    pub fn clear(&self) -> BackupResult<()> {
        if self.ledger_path.exists() {
            std::fs::remove_file(&self.ledger_path)
                .map_err(|e| BackupError::Ledger(format!("Failed to clear ledger: {}", e)))?;
        }
        Ok(())
    }

    /// Get the number of records in the ledger
    pub fn entry_count(&self) -> BackupResult<usize> {
        Ok(self.read_all()?.len())
    }

    /// Check if the ledger file exists
    pub fn exists(&self) -> bool {
        self.ledger_path.exists()
    }

    /// Get the path to the ledger file
    pub fn path(&self) -> &PathBuf {
        &self.ledger_path
    }
}
