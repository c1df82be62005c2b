//! State collection
//!
//! Reads every registry slot from the key-value store into an ordered
//! payload. Collection is read-only and all-or-nothing: the first failing
//! read aborts the backup naming the slot, so a partial snapshot is never
//! produced.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::slots::{SlotEntry, SlotKind, SLOT_REGISTRY};
use crate::error::{BackupError, BackupResult};
use crate::store::KeyValueStore;

/// Default per-slot read budget
const DEFAULT_IO_BUDGET: Duration = Duration::from_secs(5);

/// Payload plus the per-collection record counts captured alongside it
#[derive(Debug)]
pub struct CollectedState {
    /// Ordered slot entries, one per registry slot
    pub payload: Vec<SlotEntry>,
    /// Array lengths of the collection slots
    pub data_integrity: BTreeMap<String, usize>,
}

/// Reads the slot registry out of a key-value store
pub struct StateCollector {
    io_budget: Duration,
}

impl Default for StateCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCollector {
    /// Collector with the default per-slot I/O budget
    pub fn new() -> Self {
        Self {
            io_budget: DEFAULT_IO_BUDGET,
        }
    }

    /// Collector with a custom per-slot I/O budget
    ///
    /// The store trait is synchronous, so a stalled read cannot be
    /// interrupted; instead each read is timed after the fact and an
    /// over-budget slot fails the backup visibly rather than hanging the
    /// operator without a diagnosis.
    pub fn with_io_budget(io_budget: Duration) -> Self {
        Self { io_budget }
    }

    /// Collect every registry slot from `store`
    ///
    /// Missing slots become entries with `present: false` and the slot
    /// kind's default value — never omitted, so the payload enumeration
    /// is always complete and restore logic can rely on presence.
    pub fn collect(&self, store: &dyn KeyValueStore) -> BackupResult<CollectedState> {
        let mut payload = Vec::with_capacity(SLOT_REGISTRY.len());
        let mut data_integrity = BTreeMap::new();

        for spec in SLOT_REGISTRY {
            let started = Instant::now();
            let value = store
                .get(spec.name)
                .map_err(|e| BackupError::collection(spec.name, e.to_string()))?;
            let elapsed = started.elapsed();

            if elapsed > self.io_budget {
                return Err(BackupError::collection(
                    spec.name,
                    format!(
                        "read took {}ms, exceeding the {}ms budget",
                        elapsed.as_millis(),
                        self.io_budget.as_millis()
                    ),
                ));
            }

            let entry = match value {
                Some(value) => SlotEntry::present(spec, value),
                None => SlotEntry::absent(spec),
            };

            if spec.kind == SlotKind::Collection {
                let count = entry.value.as_array().map_or(0, |a| a.len());
                data_integrity.insert(spec.name.to_string(), count);
            }

            payload.push(entry);
        }

        Ok(CollectedState {
            payload,
            data_integrity,
        })
    }
}
