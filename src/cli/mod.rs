//! Command-line interface
//!
//! Implements the operator-facing surface: creating backups, inspecting
//! and restoring artifacts, and managing the backup history ledger.

pub mod backup;
pub mod history;

pub use backup::{handle_backup_command, BackupCommands};
pub use history::{handle_history_command, HistoryCommands};
