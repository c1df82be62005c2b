//! File-backed key-value store
//!
//! Stores one JSON document per slot under the data directory, written
//! atomically so a crash mid-write never leaves a half-written slot.

use std::path::PathBuf;

use serde_json::Value;

use super::file_io::{read_json_opt, write_json_atomic};
use super::KeyValueStore;
use crate::error::{BackupError, BackupResult};

/// Key-value store persisting each key as `<data_dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at `data_dir`
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(data_dir: PathBuf) -> BackupResult<Self> {
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| BackupError::Io(format!("Failed to create data directory: {}", e)))?;
        Ok(Self { data_dir })
    }

    /// Path of the document backing `key`
    fn key_path(&self, key: &str) -> BackupResult<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(BackupError::Storage(format!(
                "Invalid store key: '{}'",
                key
            )));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    /// List the keys that currently have a document on disk
    pub fn keys(&self) -> BackupResult<Vec<String>> {
        let mut keys = Vec::new();

        if !self.data_dir.exists() {
            return Ok(keys);
        }

        for entry in std::fs::read_dir(&self.data_dir)
            .map_err(|e| BackupError::Io(format!("Failed to read data directory: {}", e)))?
        {
            let entry =
                entry.map_err(|e| BackupError::Io(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    keys.push(stem.to_string_lossy().to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> BackupResult<Option<Value>> {
        let path = self.key_path(key)?;
        read_json_opt(&path)
    }

    fn set(&mut self, key: &str, value: &Value) -> BackupResult<()> {
        let path = self.key_path(key)?;
        write_json_atomic(&path, value)
    }
}
