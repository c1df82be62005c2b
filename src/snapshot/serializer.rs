//! Snapshot artifact format
//!
//! A snapshot is a single JSON document: metadata (version, timestamp,
//! environment, per-collection counts), the ordered payload, and a
//! checksum over the payload alone so metadata stays inspectable without
//! running verification.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checksum;
use super::slots::{SlotEntry, SCHEMA_VERSION};
use crate::error::{BackupError, BackupResult};

/// Metadata block of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Schema version of the engine that wrote the artifact
    pub version: String,
    /// When the snapshot was collected (UTC)
    pub timestamp: DateTime<Utc>,
    /// Environment the snapshot was taken in (app version, OS, arch)
    #[serde(default)]
    pub system_info: BTreeMap<String, String>,
    /// Record counts per collection slot, captured at collection time
    ///
    /// A sanity check for the operator, not the integrity mechanism —
    /// that is the checksum.
    #[serde(default)]
    pub data_integrity: BTreeMap<String, usize>,
}

/// The backup artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Metadata, inspectable without checksum verification
    pub metadata: SnapshotMetadata,
    /// Ordered slot entries; every registry slot is always present
    pub payload: Vec<SlotEntry>,
    /// Hex SHA-256 over the canonical payload bytes
    pub checksum: String,
}

impl Snapshot {
    /// Record counts summed across all collection slots
    pub fn total_records(&self) -> usize {
        self.metadata.data_integrity.values().sum()
    }
}

/// Builds snapshots from collected payloads and parses artifact bytes
pub struct SnapshotSerializer;

impl SnapshotSerializer {
    /// Canonical byte form of a payload, the input to checksumming
    ///
    /// Field order is fixed by the struct definitions and entry order by
    /// the payload vector, so identical payloads always produce identical
    /// bytes.
    pub fn payload_bytes(payload: &[SlotEntry]) -> BackupResult<Vec<u8>> {
        serde_json::to_vec(payload)
            .map_err(|e| BackupError::Json(format!("Failed to encode payload: {}", e)))
    }

    /// Compose a snapshot from a collected payload
    pub fn serialize(
        payload: Vec<SlotEntry>,
        data_integrity: BTreeMap<String, usize>,
        system_info: BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> BackupResult<Snapshot> {
        let bytes = Self::payload_bytes(&payload)?;
        let checksum = checksum::fingerprint(&bytes);

        Ok(Snapshot {
            metadata: SnapshotMetadata {
                version: SCHEMA_VERSION.to_string(),
                timestamp,
                system_info,
                data_integrity,
            },
            payload,
            checksum,
        })
    }

    /// Encode a snapshot as portable artifact bytes (pretty JSON)
    pub fn to_bytes(snapshot: &Snapshot) -> BackupResult<Vec<u8>> {
        serde_json::to_vec_pretty(snapshot)
            .map_err(|e| BackupError::Json(format!("Failed to encode snapshot: {}", e)))
    }

    /// Parse artifact bytes back into a snapshot
    ///
    /// Any parse or shape failure — invalid JSON, missing metadata or
    /// version, wrong field types — is reported as `MalformedArtifact`.
    pub fn deserialize(bytes: &[u8]) -> BackupResult<Snapshot> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)
            .map_err(|e| BackupError::MalformedArtifact(e.to_string()))?;

        if snapshot.metadata.version.trim().is_empty() {
            return Err(BackupError::MalformedArtifact(
                "metadata.version is empty".to_string(),
            ));
        }

        Ok(snapshot)
    }
}
