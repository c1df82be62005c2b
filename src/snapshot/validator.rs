//! Pre-restore snapshot validation
//!
//! Inspects a parsed snapshot before restore is allowed to proceed:
//! structure first, then version compatibility, then checksum
//! recomputation. Validation is pure — it never mutates state and never
//! invokes the restore executor; the caller decides what to do with a
//! non-valid verdict.

use super::checksum;
use super::serializer::{Snapshot, SnapshotSerializer};
use super::slots::SCHEMA_VERSION;

/// Outcome of validating a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Structurally sound, version-compatible, checksum matches
    Valid,
    /// Written by a schema version this engine does not accept
    ///
    /// Callers may warn and proceed with explicit operator confirmation.
    VersionUnsupported { found: String },
    /// Recomputed payload checksum differs from the embedded one
    ///
    /// The primary signal of corruption or tampering; callers must not
    /// proceed without a separate, explicit override.
    ChecksumMismatch { expected: String, actual: String },
    /// Required structure is missing or unreadable
    Malformed { reason: String },
}

impl Validation {
    /// Whether restore may proceed without any override
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::VersionUnsupported { found } => {
                write!(f, "unsupported version {} (engine is {})", found, SCHEMA_VERSION)
            }
            Self::ChecksumMismatch { .. } => write!(f, "checksum mismatch"),
            Self::Malformed { reason } => write!(f, "malformed: {}", reason),
        }
    }
}

/// Validates parsed snapshots against the running engine
pub struct SnapshotValidator;

impl SnapshotValidator {
    /// Validate `snapshot`, in order: structure, version, checksum
    pub fn validate(snapshot: &Snapshot) -> Validation {
        // Structural check: required fields carry usable values
        if snapshot.metadata.version.trim().is_empty() {
            return Validation::Malformed {
                reason: "metadata.version is empty".to_string(),
            };
        }
        if snapshot.checksum.trim().is_empty() {
            return Validation::Malformed {
                reason: "checksum is empty".to_string(),
            };
        }

        // Version compatibility: same or older major than the engine
        if !Self::version_accepted(&snapshot.metadata.version) {
            return Validation::VersionUnsupported {
                found: snapshot.metadata.version.clone(),
            };
        }

        // Checksum recomputation over the payload
        let bytes = match SnapshotSerializer::payload_bytes(&snapshot.payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Validation::Malformed {
                    reason: format!("payload not re-encodable: {}", e),
                }
            }
        };
        let actual = checksum::fingerprint(&bytes);
        if actual != snapshot.checksum {
            return Validation::ChecksumMismatch {
                expected: snapshot.checksum.clone(),
                actual,
            };
        }

        Validation::Valid
    }

    /// Accept the engine's own major version and anything older
    fn version_accepted(version: &str) -> bool {
        match (Self::major(version), Self::major(SCHEMA_VERSION)) {
            (Some(found), Some(current)) => found <= current,
            _ => false,
        }
    }

    fn major(version: &str) -> Option<u32> {
        version.trim().split('.').next()?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::slots::{lookup, SlotEntry};
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn valid_snapshot() -> Snapshot {
        let payload = vec![
            SlotEntry::present(lookup("users").unwrap(), json!([{"id": 1}])),
            SlotEntry::absent(lookup("theme").unwrap()),
        ];
        SnapshotSerializer::serialize(payload, BTreeMap::new(), BTreeMap::new(), Utc::now())
            .unwrap()
    }

    #[test]
    fn test_valid_snapshot() {
        let snapshot = valid_snapshot();
        assert_eq!(SnapshotValidator::validate(&snapshot), Validation::Valid);
    }

    #[test]
    fn test_tampered_payload_is_checksum_mismatch() {
        let mut snapshot = valid_snapshot();
        snapshot.payload[0].value = json!([{"id": 999}]);

        match SnapshotValidator::validate(&snapshot) {
            Validation::ChecksumMismatch { expected, actual } => {
                assert_ne!(expected, actual);
            }
            other => panic!("expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_newer_major_version_unsupported() {
        let mut snapshot = valid_snapshot();
        snapshot.metadata.version = "99.0.0".to_string();

        assert_eq!(
            SnapshotValidator::validate(&snapshot),
            Validation::VersionUnsupported {
                found: "99.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_older_major_version_accepted() {
        let mut snapshot = valid_snapshot();
        snapshot.metadata.version = "1.4.2".to_string();

        // Version passes; checksum still verified and still matches
        assert_eq!(SnapshotValidator::validate(&snapshot), Validation::Valid);
    }

    #[test]
    fn test_unparseable_version_unsupported() {
        let mut snapshot = valid_snapshot();
        snapshot.metadata.version = "vNext".to_string();

        assert!(matches!(
            SnapshotValidator::validate(&snapshot),
            Validation::VersionUnsupported { .. }
        ));
    }

    #[test]
    fn test_empty_checksum_is_malformed() {
        let mut snapshot = valid_snapshot();
        snapshot.checksum = String::new();

        assert!(matches!(
            SnapshotValidator::validate(&snapshot),
            Validation::Malformed { .. }
        ));
    }

    #[test]
    fn test_version_checked_before_checksum() {
        // Both the version and the payload are bad; version wins
        let mut snapshot = valid_snapshot();
        snapshot.metadata.version = "99.0.0".to_string();
        snapshot.payload[0].value = json!("tampered");

        assert!(matches!(
            SnapshotValidator::validate(&snapshot),
            Validation::VersionUnsupported { .. }
        ));
    }

    #[test]
    fn test_metadata_change_does_not_invalidate() {
        // Checksum covers the payload only
        let mut snapshot = valid_snapshot();
        snapshot
            .metadata
            .system_info
            .insert("os".to_string(), "plan9".to_string());

        assert_eq!(SnapshotValidator::validate(&snapshot), Validation::Valid);
    }
}
