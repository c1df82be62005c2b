//! Restore execution
//!
//! Applies a validated snapshot back into the key-value store. Writes are
//! ordered by data importance — collections, then configuration, then
//! preferences — so the transactional data lands first if the operation is
//! interrupted. Restore is best-effort-complete: a failing slot is
//! recorded and the remaining slots still restore, because the storage
//! layer offers no multi-key transaction to roll back with.

use super::serializer::Snapshot;
use super::slots::{lookup, SlotEntry};
use crate::store::KeyValueStore;

/// Knobs for a restore run
#[derive(Debug, Clone)]
pub struct RestorePolicy {
    /// Write slots the running engine's registry doesn't know about
    ///
    /// The store accepts arbitrary keys, so foreign slots from a newer
    /// snapshot are preserved by default; disabling this records them as
    /// skipped instead.
    pub write_unknown_slots: bool,
}

impl Default for RestorePolicy {
    fn default() -> Self {
        Self {
            write_unknown_slots: true,
        }
    }
}

/// One slot that failed to write during restore
#[derive(Debug, Clone)]
pub struct SlotFailure {
    /// Slot name
    pub slot: String,
    /// Why the write failed
    pub reason: String,
}

/// What a restore run actually did, slot by slot
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Slots written successfully, in write order
    pub restored: Vec<String>,
    /// Slots skipped (absent in the snapshot, or unknown and policy says skip)
    pub skipped: Vec<String>,
    /// Slots whose writes failed
    pub failures: Vec<SlotFailure>,
}

impl RestoreReport {
    /// Whether every applicable slot was written
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether some slots restored and some failed
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && !self.restored.is_empty()
    }

    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!(
                "Restored {} slot(s), skipped {}",
                self.restored.len(),
                self.skipped.len()
            )
        } else {
            let failed: Vec<&str> = self.failures.iter().map(|f| f.slot.as_str()).collect();
            format!(
                "Restored {} slot(s), skipped {}, FAILED: {}",
                self.restored.len(),
                self.skipped.len(),
                failed.join(", ")
            )
        }
    }
}

/// Applies snapshot payloads to a key-value store
pub struct RestoreExecutor;

impl RestoreExecutor {
    /// Write `snapshot`'s payload into `store` under `policy`
    ///
    /// Entries with `present: false` are skipped so defaults in the live
    /// store are not clobbered; present-but-empty values are written, so
    /// an intentionally cleared collection restores as cleared.
    pub fn restore(
        snapshot: &Snapshot,
        policy: &RestorePolicy,
        store: &mut dyn KeyValueStore,
    ) -> RestoreReport {
        let mut report = RestoreReport::default();

        // Rank by kind, stable within rank to preserve payload order
        let mut entries: Vec<&SlotEntry> = snapshot.payload.iter().collect();
        entries.sort_by_key(|e| e.kind.restore_rank());

        for entry in entries {
            if !entry.present {
                report.skipped.push(entry.name.clone());
                continue;
            }

            let known = lookup(&entry.name).is_some();
            if !known && !policy.write_unknown_slots {
                report.skipped.push(entry.name.clone());
                continue;
            }

            match store.set(&entry.name, &entry.value) {
                Ok(()) => report.restored.push(entry.name.clone()),
                Err(e) => report.failures.push(SlotFailure {
                    slot: entry.name.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::serializer::SnapshotSerializer;
    use crate::snapshot::slots::{lookup, SlotEntry, SlotKind};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn snapshot_from(payload: Vec<SlotEntry>) -> Snapshot {
        SnapshotSerializer::serialize(payload, BTreeMap::new(), BTreeMap::new(), Utc::now())
            .unwrap()
    }

    #[test]
    fn test_collections_restore_before_config_and_preferences() {
        // Deliberately shuffled payload
        let snapshot = snapshot_from(vec![
            SlotEntry::present(lookup("language").unwrap(), json!("pt-BR")),
            SlotEntry::present(lookup("theme").unwrap(), json!("dark")),
            SlotEntry::present(lookup("sales").unwrap(), json!([{"id": 1}])),
            SlotEntry::present(lookup("companyData").unwrap(), json!({"name": "Banca"})),
            SlotEntry::present(lookup("users").unwrap(), json!([{"id": 2}])),
        ]);

        let mut store = MemoryStore::new();
        let report = RestoreExecutor::restore(&snapshot, &RestorePolicy::default(), &mut store);

        assert!(report.is_complete());

        let log = store.write_log();
        let rank = |name: &str| lookup(name).unwrap().kind.restore_rank();
        let ranks: Vec<u8> = log.iter().map(|n| rank(n)).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted, "writes out of rank order: {:?}", log);

        // Stable within rank: sales seeded before users in the payload
        let sales_pos = log.iter().position(|n| n == "sales").unwrap();
        let users_pos = log.iter().position(|n| n == "users").unwrap();
        assert!(sales_pos < users_pos);
    }

    #[test]
    fn test_absent_slots_are_skipped() {
        let snapshot = snapshot_from(vec![
            SlotEntry::present(lookup("users").unwrap(), json!([{"id": 1}])),
            SlotEntry::absent(lookup("theme").unwrap()),
        ]);

        let mut store = MemoryStore::new();
        store.seed("theme", json!("light"));

        let report = RestoreExecutor::restore(&snapshot, &RestorePolicy::default(), &mut store);

        assert_eq!(report.restored, vec!["users".to_string()]);
        assert_eq!(report.skipped, vec!["theme".to_string()]);
        // The live value was not clobbered by the absent entry's default
        assert_eq!(store.get("theme").unwrap().unwrap(), json!("light"));
    }

    #[test]
    fn test_empty_but_present_collection_overwrites() {
        let snapshot = snapshot_from(vec![SlotEntry::present(
            lookup("products").unwrap(),
            json!([]),
        )]);

        let mut store = MemoryStore::new();
        store.seed("products", json!([{"id": 1}, {"id": 2}]));

        RestoreExecutor::restore(&snapshot, &RestorePolicy::default(), &mut store);

        // Restoring [] genuinely clears the slot
        assert_eq!(store.get("products").unwrap().unwrap(), json!([]));
    }

    #[test]
    fn test_write_failure_does_not_abort_remaining_slots() {
        let snapshot = snapshot_from(vec![
            SlotEntry::present(lookup("users").unwrap(), json!([{"id": 1}])),
            SlotEntry::present(lookup("products").unwrap(), json!([{"id": 2}])),
            SlotEntry::present(lookup("theme").unwrap(), json!("dark")),
        ]);

        let mut store = MemoryStore::new();
        store.fail_write("products");

        let report = RestoreExecutor::restore(&snapshot, &RestorePolicy::default(), &mut store);

        assert!(report.is_partial());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].slot, "products");
        // Slots after the failure still restored
        assert_eq!(store.get("theme").unwrap().unwrap(), json!("dark"));
        assert!(report.summary().contains("FAILED: products"));
    }

    #[test]
    fn test_unknown_slot_written_through_by_default() {
        let foreign = SlotEntry {
            name: "loyaltyCards".to_string(),
            kind: SlotKind::Collection,
            present: true,
            value: json!([{"id": 7}]),
        };
        let snapshot = snapshot_from(vec![foreign]);

        let mut store = MemoryStore::new();
        let report = RestoreExecutor::restore(&snapshot, &RestorePolicy::default(), &mut store);

        assert_eq!(report.restored, vec!["loyaltyCards".to_string()]);
        assert!(store.get("loyaltyCards").unwrap().is_some());
    }

    #[test]
    fn test_unknown_slot_skipped_under_strict_policy() {
        let foreign = SlotEntry {
            name: "loyaltyCards".to_string(),
            kind: SlotKind::Collection,
            present: true,
            value: json!([{"id": 7}]),
        };
        let snapshot = snapshot_from(vec![foreign]);

        let policy = RestorePolicy {
            write_unknown_slots: false,
        };
        let mut store = MemoryStore::new();
        let report = RestoreExecutor::restore(&snapshot, &policy, &mut store);

        assert_eq!(report.skipped, vec!["loyaltyCards".to_string()]);
        assert!(store.get("loyaltyCards").unwrap().is_none());
    }
}
