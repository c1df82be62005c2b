//! Custom error types for the backup engine
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for backup engine operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A store read failed while collecting state for a backup
    #[error("Failed to collect slot '{slot}': {reason}")]
    Collection { slot: String, reason: String },

    /// The supplied file is not a parseable snapshot
    #[error("Malformed backup artifact: {0}")]
    MalformedArtifact(String),

    /// The snapshot was written by a schema version this engine does not accept
    #[error("Unsupported snapshot version: {0}")]
    VersionUnsupported(String),

    /// The snapshot payload does not match its embedded checksum
    #[error("Snapshot checksum does not match payload")]
    ChecksumMismatch,

    /// A backup or restore operation is already running
    #[error("Another backup or restore operation is already in progress")]
    BackupInProgress,

    /// Backup history ledger errors
    #[error("History ledger error: {0}")]
    Ledger(String),

    /// Entity not found errors
    #[error("{what} not found: {identifier}")]
    NotFound {
        what: &'static str,
        identifier: String,
    },
}

impl BackupError {
    /// Create a collection failure for a specific slot
    pub fn collection(slot: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Collection {
            slot: slot.into(),
            reason: reason.into(),
        }
    }

    /// Create a "not found" error for backup artifacts
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            what: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for ledger records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            what: "History record",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error aborts a backup during collection
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for backup engine operations
pub type BackupResult<T> = Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackupError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_collection_error() {
        let err = BackupError::collection("products", "disk unplugged");
        assert_eq!(
            err.to_string(),
            "Failed to collect slot 'products': disk unplugged"
        );
        assert!(err.is_collection());
    }

    #[test]
    fn test_not_found_error() {
        let err = BackupError::backup_not_found("latest");
        assert_eq!(err.to_string(), "Backup not found: latest");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let backup_err: BackupError = io_err.into();
        assert!(matches!(backup_err, BackupError::Io(_)));
    }

    #[test]
    fn test_checksum_mismatch_display() {
        let err = BackupError::ChecksumMismatch;
        assert_eq!(err.to_string(), "Snapshot checksum does not match payload");
    }
}
