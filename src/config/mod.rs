//! Configuration module for the backup engine
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Auto-backup settings persistence

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AutoBackupSettings, BackupFrequency, Settings};
