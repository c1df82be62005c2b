//! Backup history ledger
//!
//! An append-only, operator-visible record of past backup attempts —
//! metadata only, never the payload. The ledger and the artifacts are
//! independent: losing the ledger never prevents restoring an artifact,
//! and restore never consults the ledger.
//!
//! # Architecture
//!
//! - `BackupRecord`: one attempt (success or failure) with id, timestamp,
//!   size, kind, status, and the slot names that were included
//! - `BackupHistoryLedger`: line-delimited JSON (JSONL) persistence with
//!   filtered listing and bulk delete

mod ledger;
mod record;

pub use ledger::{BackupHistoryLedger, HistoryFilter};
pub use record::{BackupKind, BackupRecord, BackupStatus, RecordId};

pub(crate) use record::format_size;
