//! In-memory key-value store
//!
//! A test double for the persistence boundary. Records write order and can
//! be told to fail specific keys, which is how the collector's
//! fail-whole-backup behavior and the executor's partial-failure reporting
//! are exercised.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::KeyValueStore;
use crate::error::{BackupError, BackupResult};

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
    /// Keys whose reads should fail
    fail_reads: HashSet<String>,
    /// Keys whose writes should fail
    fail_writes: HashSet<String>,
    /// Keys in the order they were written
    write_log: Vec<String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without touching the write log
    pub fn seed(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Make reads of `key` fail with a storage error
    pub fn fail_read(&mut self, key: impl Into<String>) {
        self.fail_reads.insert(key.into());
    }

    /// Make writes of `key` fail with a storage error
    pub fn fail_write(&mut self, key: impl Into<String>) {
        self.fail_writes.insert(key.into());
    }

    /// Keys written through `set`, in call order
    pub fn write_log(&self) -> &[String] {
        &self.write_log
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BackupResult<Option<Value>> {
        if self.fail_reads.contains(key) {
            return Err(BackupError::Storage(format!(
                "Simulated read failure for '{}'",
                key
            )));
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> BackupResult<()> {
        if self.fail_writes.contains(key) {
            return Err(BackupError::Storage(format!(
                "Simulated write failure for '{}'",
                key
            )));
        }
        self.values.insert(key.to_string(), value.clone());
        self.write_log.push(key.to_string());
        Ok(())
    }
}
