//! Backup history records
//!
//! Defines the structure of ledger entries: what kind of backup ran, when,
//! how it ended, and what it contained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique, opaque identifier of a ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bkp-{}", &self.0.to_string()[..8])
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("bkp-").unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What triggered a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    /// Operator-initiated
    Manual,
    /// Triggered by the auto-backup schedule
    Automatic,
    /// Triggered by an external scheduler
    Scheduled,
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Automatic => write!(f, "automatic"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl BackupKind {
    /// Parse a kind from operator input
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(Self::Manual),
            "automatic" | "auto" => Some(Self::Automatic),
            "scheduled" => Some(Self::Scheduled),
            _ => None,
        }
    }
}

/// How a backup attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    /// Artifact written and ledgered
    Success,
    /// The attempt failed; no artifact was produced
    Error,
    /// Still running (only ever observed by the host mid-operation)
    InProgress,
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::InProgress => write!(f, "in progress"),
        }
    }
}

/// One entry in the backup history ledger
///
/// Never mutated after creation except by deletion, and never referenced
/// by a snapshot artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    /// Unique record identifier
    pub id: RecordId,

    /// When the backup ran (UTC)
    pub date: DateTime<Utc>,

    /// Serialized artifact size in bytes (zero for failed attempts)
    pub size_bytes: u64,

    /// What triggered the backup
    pub kind: BackupKind,

    /// How the attempt ended
    pub status: BackupStatus,

    /// Operator-facing description
    pub description: String,

    /// Slot names included in the snapshot
    pub data_types: Vec<String>,

    /// Payload checksum of the artifact (absent for failed attempts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Snapshot schema version the artifact was written with
    pub version: String,
}

impl BackupRecord {
    /// Record a completed backup
    pub fn success(
        kind: BackupKind,
        description: impl Into<String>,
        size_bytes: u64,
        data_types: Vec<String>,
        checksum: String,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            date: Utc::now(),
            size_bytes,
            kind,
            status: BackupStatus::Success,
            description: description.into(),
            data_types,
            checksum: Some(checksum),
            version: version.into(),
        }
    }

    /// Record a failed backup attempt
    pub fn failure(kind: BackupKind, description: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            date: Utc::now(),
            size_bytes: 0,
            kind,
            status: BackupStatus::Error,
            description: description.into(),
            data_types: Vec::new(),
            checksum: None,
            version: version.into(),
        }
    }

    /// Artifact size in human-readable form
    pub fn human_size(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count in human-readable form
pub(crate) fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_display() {
        let id = RecordId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("bkp-"));
        assert_eq!(display.len(), 12); // "bkp-" + 8 chars
    }

    #[test]
    fn test_record_id_from_str() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: RecordId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(BackupKind::parse("manual"), Some(BackupKind::Manual));
        assert_eq!(BackupKind::parse("auto"), Some(BackupKind::Automatic));
        assert_eq!(BackupKind::parse("SCHEDULED"), Some(BackupKind::Scheduled));
        assert_eq!(BackupKind::parse("hourly"), None);
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&BackupStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&BackupStatus::Success).unwrap(),
            "\"success\""
        );
    }

    #[test]
    fn test_success_record() {
        let record = BackupRecord::success(
            BackupKind::Manual,
            "before migration",
            2048,
            vec!["users".to_string(), "products".to_string()],
            "abc123".to_string(),
            "2.0.0",
        );

        assert_eq!(record.status, BackupStatus::Success);
        assert_eq!(record.human_size(), "2.0 KB");
        assert_eq!(record.checksum.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_failure_record() {
        let record = BackupRecord::failure(BackupKind::Automatic, "store unreachable", "2.0.0");

        assert_eq!(record.status, BackupStatus::Error);
        assert_eq!(record.size_bytes, 0);
        assert!(record.checksum.is_none());
        assert!(record.data_types.is_empty());
    }

    #[test]
    fn test_record_serde_round_trip() {
        let record = BackupRecord::success(
            BackupKind::Scheduled,
            "nightly",
            10,
            vec!["sales".to_string()],
            "deadbeef".to_string(),
            "2.0.0",
        );

        let json = serde_json::to_string(&record).unwrap();
        let back: BackupRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, record.id);
        assert_eq!(back.kind, BackupKind::Scheduled);
        assert_eq!(back.status, BackupStatus::Success);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024 * 3 / 2), "1.5 MB");
    }
}
