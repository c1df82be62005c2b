//! Single-flight operation lock
//!
//! At most one backup or restore may run at a time: interleaving two
//! operations over the same key-value store would corrupt both. A second
//! caller is rejected with `BackupInProgress` rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{BackupError, BackupResult};

/// Flag guarding backup/restore execution
#[derive(Debug, Default)]
pub struct OperationLock {
    busy: Arc<AtomicBool>,
}

impl OperationLock {
    /// Create an idle lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock, failing with `BackupInProgress` if an operation
    /// is already running
    ///
    /// The returned guard releases the lock when dropped.
    pub fn try_acquire(&self) -> BackupResult<OperationGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BackupError::BackupInProgress);
        }

        Ok(OperationGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Whether an operation currently holds the lock
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// RAII guard holding the operation lock
#[derive(Debug)]
pub struct OperationGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
