//! Versioned slot registry
//!
//! A slot is one named unit of application state: an entity collection, a
//! configuration object, or a preference scalar. The registry enumerates
//! every slot the engine knows about, in collection order. It is versioned
//! alongside [`SCHEMA_VERSION`]: adding a slot in a later version is
//! additive, and snapshots that carry slots this build doesn't know keep
//! working because entries record their own kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot schema version written into new artifacts
///
/// Restore accepts artifacts with the same or an older major version.
pub const SCHEMA_VERSION: &str = "2.0.0";

/// What kind of state a slot holds, and when it is restored
///
/// Restore writes all `Collection` slots first, then `Config`, then
/// `Preference`, so the most valuable data lands first if a restore is
/// interrupted partway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// An entity collection (array of records)
    Collection,
    /// A configuration object
    Config,
    /// A UI preference scalar
    Preference,
    /// A kind introduced by a newer schema than this build knows
    ///
    /// Parsing an artifact must not fail on it; such slots restore last.
    #[serde(other)]
    Unknown,
}

impl SlotKind {
    /// Restore ordering rank (lower restores earlier)
    pub fn restore_rank(&self) -> u8 {
        match self {
            Self::Collection => 0,
            Self::Config => 1,
            Self::Preference => 2,
            Self::Unknown => 3,
        }
    }

    /// Default value substituted for a slot the store has never written
    pub fn default_value(&self) -> Value {
        match self {
            Self::Collection => Value::Array(Vec::new()),
            Self::Config | Self::Preference | Self::Unknown => Value::Null,
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection => write!(f, "collection"),
            Self::Config => write!(f, "config"),
            Self::Preference => write!(f, "preference"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One entry in the slot registry
#[derive(Debug, Clone, Copy)]
pub struct SlotSpec {
    /// Stable slot identifier, also the key-value store key
    pub name: &'static str,
    /// Kind, which fixes default value and restore rank
    pub kind: SlotKind,
}

/// Every slot the engine collects, in collection order
///
/// Business collections first, then configuration, then preferences.
pub const SLOT_REGISTRY: &[SlotSpec] = &[
    // Business collections
    SlotSpec { name: "users", kind: SlotKind::Collection },
    SlotSpec { name: "products", kind: SlotKind::Collection },
    SlotSpec { name: "categories", kind: SlotKind::Collection },
    SlotSpec { name: "suppliers", kind: SlotKind::Collection },
    SlotSpec { name: "sales", kind: SlotKind::Collection },
    SlotSpec { name: "cashMovements", kind: SlotKind::Collection },
    SlotSpec { name: "expenses", kind: SlotKind::Collection },
    SlotSpec { name: "cashRegisters", kind: SlotKind::Collection },
    SlotSpec { name: "cashSessions", kind: SlotKind::Collection },
    // Configuration
    SlotSpec { name: "companyData", kind: SlotKind::Config },
    SlotSpec { name: "companyLogo", kind: SlotKind::Config },
    SlotSpec { name: "favicon", kind: SlotKind::Config },
    SlotSpec { name: "customColors", kind: SlotKind::Config },
    SlotSpec { name: "theme", kind: SlotKind::Config },
    SlotSpec { name: "rolesPermissions", kind: SlotKind::Config },
    SlotSpec { name: "notificationSettings", kind: SlotKind::Config },
    SlotSpec { name: "currentUser", kind: SlotKind::Config },
    // Preferences
    SlotSpec { name: "sidebarState", kind: SlotKind::Preference },
    SlotSpec { name: "language", kind: SlotKind::Preference },
    SlotSpec { name: "currency", kind: SlotKind::Preference },
    SlotSpec { name: "timezone", kind: SlotKind::Preference },
    SlotSpec { name: "defaultPaymentMethod", kind: SlotKind::Preference },
    SlotSpec { name: "printReceipt", kind: SlotKind::Preference },
    SlotSpec { name: "autoBackupSettings", kind: SlotKind::Preference },
];

/// Look up a slot by name in the registry
pub fn lookup(name: &str) -> Option<&'static SlotSpec> {
    SLOT_REGISTRY.iter().find(|s| s.name == name)
}

/// One slot inside a snapshot payload
///
/// `present` is an explicit discriminator: a slot the store had never
/// written is carried with `present: false` and a default value, which is
/// distinct from a slot that was written and happens to be empty. Restore
/// skips absent entries but writes present-but-empty ones, so restoring
/// `[]` genuinely clears a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    /// Slot name
    pub name: String,
    /// Slot kind as recorded at collection time
    pub kind: SlotKind,
    /// Whether the store actually held a value for this slot
    pub present: bool,
    /// The slot's value (a default when `present` is false)
    pub value: Value,
}

impl SlotEntry {
    /// Entry for a slot the store held a value for
    pub fn present(spec: &SlotSpec, value: Value) -> Self {
        Self {
            name: spec.name.to_string(),
            kind: spec.kind,
            present: true,
            value,
        }
    }

    /// Entry for a slot the store had never written
    pub fn absent(spec: &SlotSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            kind: spec.kind,
            present: false,
            value: spec.kind.default_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_no_duplicates() {
        let mut names: Vec<&str> = SLOT_REGISTRY.iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), SLOT_REGISTRY.len());
    }

    #[test]
    fn test_registry_ordered_by_rank() {
        // Collection slots come before config, config before preferences
        let ranks: Vec<u8> = SLOT_REGISTRY.iter().map(|s| s.kind.restore_rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("sales").unwrap().kind, SlotKind::Collection);
        assert_eq!(lookup("theme").unwrap().kind, SlotKind::Config);
        assert_eq!(lookup("language").unwrap().kind, SlotKind::Preference);
        assert!(lookup("nonexistent").is_none());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(
            SlotKind::Collection.default_value(),
            Value::Array(Vec::new())
        );
        assert_eq!(SlotKind::Config.default_value(), Value::Null);
    }

    #[test]
    fn test_absent_entry_carries_default() {
        let spec = lookup("products").unwrap();
        let entry = SlotEntry::absent(spec);

        assert!(!entry.present);
        assert_eq!(entry.value, Value::Array(Vec::new()));
    }

    #[test]
    fn test_foreign_kind_parses_as_unknown() {
        let json = r#"{"name": "loyaltyCards", "kind": "blob", "present": true, "value": []}"#;
        let entry: SlotEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.kind, SlotKind::Unknown);
        assert_eq!(entry.kind.restore_rank(), 3);
    }

    #[test]
    fn test_slot_entry_serde_round_trip() {
        let spec = lookup("users").unwrap();
        let entry = SlotEntry::present(spec, serde_json::json!([{"id": 1}]));

        let json = serde_json::to_string(&entry).unwrap();
        let back: SlotEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
