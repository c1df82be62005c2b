//! pdv-backup - Backup and restore engine for a small-retail POS system
//!
//! This library collects the entire heterogeneous application state of a
//! point-of-sale system — business records, configuration, preferences —
//! into one versioned, integrity-checked snapshot artifact, and can later
//! reconstruct the full system state from such an artifact.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution and auto-backup settings
//! - `error`: Custom error types
//! - `store`: The key-value persistence boundary (file-backed and in-memory)
//! - `snapshot`: Collection, fingerprinting, serialization, validation, restore
//! - `history`: Append-only backup history ledger
//! - `engine`: Orchestration and the single-flight operation lock
//! - `cli`: Operator-facing commands
//!
//! # Example
//!
//! ```rust,ignore
//! use pdv_backup::config::paths::AppPaths;
//! use pdv_backup::engine::BackupEngine;
//! use pdv_backup::history::BackupKind;
//! use pdv_backup::store::FileStore;
//!
//! let paths = AppPaths::new()?;
//! let engine = BackupEngine::new(paths.clone())?;
//! let store = FileStore::new(paths.data_dir())?;
//!
//! let outcome = engine.create_backup(&store, BackupKind::Manual, "nightly")?;
//! println!("wrote {}", outcome.path.display());
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod snapshot;
pub mod store;

pub use error::{BackupError, BackupResult};
