//! Snapshot engine: collect, fingerprint, serialize, validate, restore
//!
//! A backup run assembles the entire application state into a single
//! versioned [`Snapshot`]: every enumerated slot is read from the
//! key-value store, the payload is fingerprinted, and the result is
//! serialized to a portable JSON artifact. Restore runs the pipeline in
//! reverse: parse, validate, then write slots back in order of data
//! importance.
//!
//! # Architecture
//!
//! - [`slots`]: the versioned registry of slot names and kinds
//! - [`checksum`]: payload fingerprinting
//! - [`collector`]: reads the store into an in-memory payload
//! - [`serializer`]: snapshot <-> artifact bytes
//! - [`validator`]: pre-restore inspection of a parsed artifact
//! - [`restore`]: applies a validated snapshot back into the store

pub mod checksum;
pub mod collector;
pub mod restore;
pub mod serializer;
pub mod slots;
pub mod validator;

pub use collector::{CollectedState, StateCollector};
pub use restore::{RestoreExecutor, RestorePolicy, RestoreReport, SlotFailure};
pub use serializer::{Snapshot, SnapshotMetadata, SnapshotSerializer};
pub use slots::{SlotEntry, SlotKind, SlotSpec, SCHEMA_VERSION, SLOT_REGISTRY};
pub use validator::{SnapshotValidator, Validation};
