//! Backup CLI commands
//!
//! Implements CLI commands for creating, inspecting, restoring, and
//! pruning backup artifacts.

use clap::Subcommand;
use std::path::PathBuf;

use crate::config::paths::AppPaths;
use crate::config::settings::Settings;
use crate::engine::{BackupEngine, RestoreOverrides};
use crate::error::{BackupError, BackupResult};
use crate::history::BackupKind;
use crate::snapshot::{RestorePolicy, Validation};
use crate::store::FileStore;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Description recorded in the backup history
        #[arg(short, long, default_value = "Manual backup")]
        description: String,

        /// Record this run as an automatic backup
        #[arg(long, conflicts_with = "scheduled")]
        auto: bool,

        /// Record this run as a scheduled backup
        #[arg(long)]
        scheduled: bool,
    },

    /// List all available backup artifacts
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the metadata embedded in a backup artifact
    Info {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,
    },

    /// Restore from a backup, replacing all current data
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,

        /// Proceed even if the snapshot version is not supported
        #[arg(long)]
        accept_version: bool,

        /// Proceed even if the payload checksum does not match (the
        /// artifact may be corrupted or tampered with)
        #[arg(long)]
        accept_checksum: bool,

        /// Skip slots this engine does not know instead of writing them
        #[arg(long)]
        skip_unknown: bool,
    },

    /// Delete artifacts older than the configured retention window
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &AppPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> BackupResult<()> {
    let engine = BackupEngine::new(paths.clone())?;

    match cmd {
        BackupCommands::Create {
            description,
            auto,
            scheduled,
        } => {
            let kind = if auto {
                BackupKind::Automatic
            } else if scheduled {
                BackupKind::Scheduled
            } else {
                BackupKind::Manual
            };

            println!("Creating backup...");
            let store = FileStore::new(paths.data_dir())?;
            let outcome = engine.create_backup(&store, kind, &description)?;

            println!("Backup created: {}", outcome.record.human_size());
            println!("Location: {}", outcome.path.display());
            println!(
                "Records: {} across {} collection(s)",
                outcome.snapshot.total_records(),
                outcome.snapshot.metadata.data_integrity.len()
            );
            println!("Checksum: {}", outcome.snapshot.checksum);
        }

        BackupCommands::List { verbose } => {
            let artifacts = engine.list_artifacts()?;

            if artifacts.is_empty() {
                println!("No backups found.");
                println!("Create one with: pdv-backup backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, artifact) in artifacts.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(artifact.created_at);
                let age_str = format_duration(age);

                if verbose {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        artifact.filename,
                        artifact.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(artifact.size_bytes),
                        age_str,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        artifact.filename,
                        age_str,
                        format_size(artifact.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", artifacts.len());
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&engine, paths, &backup)?;
            let (snapshot, validation) = engine.inspect(&backup_path)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!(
                "Created: {}",
                snapshot.metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Schema version: {}", snapshot.metadata.version);
            println!("Validation: {}", validation);
            println!();

            if !snapshot.metadata.system_info.is_empty() {
                println!("Environment:");
                for (key, value) in &snapshot.metadata.system_info {
                    println!("  {}: {}", key, value);
                }
                println!();
            }

            println!("Contents:");
            for (slot, count) in &snapshot.metadata.data_integrity {
                println!("  {:<16} {} record(s)", slot, count);
            }
            println!("  {} slot(s) total", snapshot.payload.len());
        }

        BackupCommands::Restore {
            backup,
            force,
            accept_version,
            accept_checksum,
            skip_unknown,
        } => {
            let backup_path = resolve_backup_path(&engine, paths, &backup)?;

            // Validate first and show the operator what they are about
            // to apply
            let (snapshot, validation) = engine.inspect(&backup_path)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            println!(
                "Created: {}",
                snapshot.metadata.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Schema version: {}", snapshot.metadata.version);
            println!("Records: {}", snapshot.total_records());
            println!("Validation: {}", validation);
            println!();

            match &validation {
                Validation::Valid => {}
                Validation::VersionUnsupported { .. } if accept_version => {
                    println!("WARNING: proceeding past an unsupported version.");
                }
                Validation::VersionUnsupported { .. } => {
                    println!("This snapshot's version is not supported by this engine.");
                    println!("To proceed anyway, run again with --accept-version.");
                    return Ok(());
                }
                Validation::ChecksumMismatch { .. } if accept_checksum => {
                    println!("WARNING: proceeding past a checksum mismatch.");
                    println!("The artifact may be corrupted or tampered with.");
                }
                Validation::ChecksumMismatch { .. } => {
                    println!("The payload does not match the embedded checksum.");
                    println!("This usually means corruption or tampering.");
                    println!("To proceed anyway, run again with --accept-checksum.");
                    return Ok(());
                }
                Validation::Malformed { reason } => {
                    return Err(BackupError::MalformedArtifact(reason.clone()));
                }
            }

            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  pdv-backup backup restore {} --force", backup);
                return Ok(());
            }

            // Create a backup of current data before restoring
            println!("Creating backup of current data before restore...");
            let mut store = FileStore::new(paths.data_dir())?;
            let pre_restore =
                engine.create_backup(&store, BackupKind::Manual, "Pre-restore safety backup")?;
            println!(
                "Pre-restore backup saved: {}",
                pre_restore.path.file_name().unwrap().to_string_lossy()
            );
            println!();

            println!("Restoring from backup...");
            let policy = RestorePolicy {
                write_unknown_slots: !skip_unknown,
            };
            let overrides = RestoreOverrides {
                accept_unsupported_version: accept_version,
                accept_checksum_mismatch: accept_checksum,
            };
            let report = engine.restore_from_file(&mut store, &backup_path, &policy, overrides)?;

            println!("{}", report.summary());

            if report.is_complete() {
                println!("\nAll data has been restored successfully.");
            } else {
                println!("\nWARNING: restore completed partially.");
                for failure in &report.failures {
                    println!("  {}: {}", failure.slot, failure.reason);
                }
                println!("Re-attempt the restore or investigate the failed slots.");
            }
        }

        BackupCommands::Prune { force } => {
            let retention_days = settings.auto_backup.retention_days;
            let artifacts = engine.list_artifacts()?;
            let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(retention_days));
            let to_delete = artifacts.iter().filter(|a| a.created_at < cutoff).count();

            if to_delete == 0 {
                println!("No backups to prune.");
                println!(
                    "Retention: {} days, {} backup(s) on disk.",
                    retention_days,
                    artifacts.len()
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention: {} days", retention_days);
            println!("Backups on disk: {}", artifacts.len());
            println!("To be deleted: {}", to_delete);
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  pdv-backup backup prune --force");
                return Ok(());
            }

            let deleted = engine.prune(retention_days)?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path(
    engine: &BackupEngine,
    paths: &AppPaths,
    backup: &str,
) -> BackupResult<PathBuf> {
    // Handle "latest" keyword
    if backup.eq_ignore_ascii_case("latest") {
        return engine
            .latest_artifact()?
            .map(|a| a.path)
            .ok_or_else(|| BackupError::backup_not_found("latest"));
    }

    // Check if it's a full path
    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    // Check if it's a filename in the backup directory
    let backup_path = paths.backup_dir().join(backup);
    if backup_path.exists() {
        return Ok(backup_path);
    }

    Err(BackupError::backup_not_found(backup))
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    let months = days / 30;
    format!("{}mo", months)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    crate::history::format_size(bytes)
}
