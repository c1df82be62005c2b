//! Backup engine orchestration
//!
//! Ties the pipeline together: collect state through the key-value store,
//! serialize and fingerprint it, write the artifact atomically, and ledger
//! the attempt. Restore runs the inverse pipeline behind the same
//! single-flight lock.
//!
//! # Architecture
//!
//! - `OperationLock`: at most one backup or restore in flight
//! - `BackupEngine`: create/inspect/restore/prune operations and artifact
//!   bookkeeping (naming, listing, retention)

mod lock;

pub use lock::{OperationGuard, OperationLock};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::config::paths::AppPaths;
use crate::error::{BackupError, BackupResult};
use crate::history::{BackupHistoryLedger, BackupKind, BackupRecord};
use crate::snapshot::{
    RestoreExecutor, RestorePolicy, RestoreReport, Snapshot, SnapshotSerializer,
    SnapshotValidator, StateCollector, Validation, SCHEMA_VERSION,
};
use crate::store::file_io::write_bytes_atomic;
use crate::store::KeyValueStore;

/// Artifact filename prefix, kept stable for compatibility with artifacts
/// produced by earlier releases
const ARTIFACT_PREFIX: &str = "backup-pdv-completo-";

/// Metadata about an artifact file on disk
#[derive(Debug, Clone)]
pub struct ArtifactInfo {
    /// Artifact filename
    pub filename: String,
    /// Full path to the artifact
    pub path: PathBuf,
    /// When the backup was created (parsed from the filename)
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Result of a completed backup
#[derive(Debug)]
pub struct BackupOutcome {
    /// Where the artifact was written
    pub path: PathBuf,
    /// The ledger record describing the run
    pub record: BackupRecord,
    /// The snapshot that was written (metadata drives confirmation UIs)
    pub snapshot: Snapshot,
}

/// Operator overrides for proceeding past a non-valid snapshot
///
/// Both default to off; each requires its own explicit confirmation
/// upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestoreOverrides {
    /// Proceed although the snapshot's schema version is not accepted
    pub accept_unsupported_version: bool,
    /// Proceed although the payload checksum does not match
    pub accept_checksum_mismatch: bool,
}

/// Orchestrates backup and restore runs
pub struct BackupEngine {
    paths: AppPaths,
    collector: StateCollector,
    ledger: BackupHistoryLedger,
    lock: OperationLock,
}

impl BackupEngine {
    /// Create an engine rooted at `paths`, ensuring directories exist
    pub fn new(paths: AppPaths) -> BackupResult<Self> {
        paths.ensure_directories()?;
        let ledger = BackupHistoryLedger::new(paths.history_file());

        Ok(Self {
            paths,
            collector: StateCollector::new(),
            ledger,
            lock: OperationLock::new(),
        })
    }

    /// The backup history ledger
    pub fn history(&self) -> &BackupHistoryLedger {
        &self.ledger
    }

    /// Whether a backup or restore is currently running
    pub fn is_busy(&self) -> bool {
        self.lock.is_busy()
    }

    /// Collect the full application state and write a snapshot artifact
    ///
    /// Every completed attempt — success or collection failure — is
    /// appended to the ledger. No artifact is produced on failure.
    pub fn create_backup(
        &self,
        store: &dyn KeyValueStore,
        kind: BackupKind,
        description: &str,
    ) -> BackupResult<BackupOutcome> {
        let _guard = self.lock.try_acquire()?;

        let collected = match self.collector.collect(store) {
            Ok(collected) => collected,
            Err(err) => {
                let record = BackupRecord::failure(kind, err.to_string(), SCHEMA_VERSION);
                self.ledger.append(&record)?;
                return Err(err);
            }
        };

        let timestamp = Utc::now();
        let data_types: Vec<String> = collected.payload.iter().map(|e| e.name.clone()).collect();

        let snapshot = SnapshotSerializer::serialize(
            collected.payload,
            collected.data_integrity,
            system_info(),
            timestamp,
        )?;
        let bytes = SnapshotSerializer::to_bytes(&snapshot)?;

        // Filenames are second-granular; bump until free so two backups
        // in the same second don't overwrite each other
        let backup_dir = self.paths.backup_dir();
        let mut stamp = timestamp;
        let mut path = backup_dir.join(artifact_filename(stamp));
        while path.exists() {
            stamp = stamp + chrono::Duration::seconds(1);
            path = backup_dir.join(artifact_filename(stamp));
        }
        write_bytes_atomic(&path, &bytes)?;

        let record = BackupRecord::success(
            kind,
            description,
            bytes.len() as u64,
            data_types,
            snapshot.checksum.clone(),
            SCHEMA_VERSION,
        );
        self.ledger.append(&record)?;

        Ok(BackupOutcome {
            path,
            record,
            snapshot,
        })
    }

    /// Parse and validate an artifact without touching any state
    ///
    /// Drives the pre-restore confirmation surface: the caller shows the
    /// operator the embedded metadata and the validation verdict.
    pub fn inspect(&self, path: &Path) -> BackupResult<(Snapshot, Validation)> {
        let bytes = read_artifact(path)?;
        let snapshot = SnapshotSerializer::deserialize(&bytes)?;
        let validation = SnapshotValidator::validate(&snapshot);
        Ok((snapshot, validation))
    }

    /// Restore an artifact into `store`
    ///
    /// Validation gates execution: a non-valid snapshot is rejected unless
    /// the matching override was explicitly set. Once the executor starts
    /// writing, the operation runs to completion and reports per-slot
    /// failures instead of aborting.
    pub fn restore_from_file(
        &self,
        store: &mut dyn KeyValueStore,
        path: &Path,
        policy: &RestorePolicy,
        overrides: RestoreOverrides,
    ) -> BackupResult<RestoreReport> {
        let _guard = self.lock.try_acquire()?;

        let bytes = read_artifact(path)?;
        let snapshot = SnapshotSerializer::deserialize(&bytes)?;

        match SnapshotValidator::validate(&snapshot) {
            Validation::Valid => {}
            Validation::VersionUnsupported { found } => {
                if !overrides.accept_unsupported_version {
                    return Err(BackupError::VersionUnsupported(found));
                }
            }
            Validation::ChecksumMismatch { .. } => {
                if !overrides.accept_checksum_mismatch {
                    return Err(BackupError::ChecksumMismatch);
                }
            }
            Validation::Malformed { reason } => {
                return Err(BackupError::MalformedArtifact(reason));
            }
        }

        Ok(RestoreExecutor::restore(&snapshot, policy, store))
    }

    /// List artifact files in the backup directory, newest first
    pub fn list_artifacts(&self) -> BackupResult<Vec<ArtifactInfo>> {
        let backup_dir = self.paths.backup_dir();
        if !backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut artifacts = Vec::new();

        for entry in fs::read_dir(&backup_dir)
            .map_err(|e| BackupError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| BackupError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(info) = parse_artifact_info(&path) {
                    artifacts.push(info);
                }
            }
        }

        // Sort by date, newest first
        artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(artifacts)
    }

    /// Get the most recent artifact
    pub fn latest_artifact(&self) -> BackupResult<Option<ArtifactInfo>> {
        let artifacts = self.list_artifacts()?;
        Ok(artifacts.into_iter().next())
    }

    /// Delete artifacts older than `retention_days`, returning their paths
    pub fn prune(&self, retention_days: u32) -> BackupResult<Vec<PathBuf>> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
        let mut deleted = Vec::new();

        for artifact in self.list_artifacts()? {
            if artifact.created_at < cutoff {
                fs::remove_file(&artifact.path)
                    .map_err(|e| BackupError::Io(format!("Failed to delete old backup: {}", e)))?;
                deleted.push(artifact.path);
            }
        }

        Ok(deleted)
    }
}

/// Environment stamped into snapshot metadata
fn system_info() -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    info.insert(
        "appVersion".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    info.insert("os".to_string(), std::env::consts::OS.to_string());
    info.insert("arch".to_string(), std::env::consts::ARCH.to_string());
    info
}

/// Artifact filename for a backup taken at `timestamp`
fn artifact_filename(timestamp: DateTime<Utc>) -> String {
    format!(
        "{}{}.json",
        ARTIFACT_PREFIX,
        timestamp.format("%d%m%Y-%H%M%S")
    )
}

/// Read an artifact file, mapping a missing file to a not-found error
fn read_artifact(path: &Path) -> BackupResult<Vec<u8>> {
    if !path.exists() {
        return Err(BackupError::backup_not_found(path.display().to_string()));
    }
    fs::read(path).map_err(|e| BackupError::Io(format!("Failed to read backup file: {}", e)))
}

/// Parse artifact info from a backup file path
fn parse_artifact_info(path: &Path) -> Option<ArtifactInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();

    let date_part = filename
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(".json")?;
    let created_at = parse_artifact_timestamp(date_part)?;

    let metadata = fs::metadata(path).ok()?;

    Some(ArtifactInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes: metadata.len(),
    })
}

/// Parse the `<DDMMYYYY>-<HHMMSS>` portion of an artifact filename
fn parse_artifact_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = date_str.split_once('-')?;

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let day: u32 = date_part[0..2].parse().ok()?;
    let month: u32 = date_part[2..4].parse().ok()?;
    let year: i32 = date_part[4..8].parse().ok()?;
    let hour: u32 = time_part[0..2].parse().ok()?;
    let minute: u32 = time_part[2..4].parse().ok()?;
    let second: u32 = time_part[4..6].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;

    Some(DateTime::from_naive_utc_and_offset(
        NaiveDateTime::new(date, time),
        Utc,
    ))
}
