//! Backup history CLI commands
//!
//! Implements CLI commands for viewing and pruning the backup history
//! ledger.

use clap::Subcommand;

use crate::config::paths::AppPaths;
use crate::error::{BackupError, BackupResult};
use crate::history::{BackupHistoryLedger, BackupKind, HistoryFilter, RecordId};

/// History subcommands
#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List backup history records
    List {
        /// Filter by backup type (manual, automatic, scheduled)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Delete specific history records by id
    Remove {
        /// Record ids to delete (full UUIDs or bkp-prefixed)
        ids: Vec<String>,
    },

    /// Delete the entire backup history
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a history command
pub fn handle_history_command(paths: &AppPaths, cmd: HistoryCommands) -> BackupResult<()> {
    let ledger = BackupHistoryLedger::new(paths.history_file());

    match cmd {
        HistoryCommands::List { kind, verbose } => {
            let kind = match kind {
                Some(s) => Some(BackupKind::parse(&s).ok_or_else(|| {
                    BackupError::Config(format!("Unknown backup type: '{}'", s))
                })?),
                None => None,
            };

            let filter = HistoryFilter {
                kind,
                ..Default::default()
            };
            let records = ledger.list(&filter)?;

            if records.is_empty() {
                println!("No backup history.");
                return Ok(());
            }

            println!("Backup History");
            println!("==============");
            println!();

            for record in &records {
                if verbose {
                    println!(
                        "{} [{}] {} {}\n   Description: {}\n   Size: {}\n   Slots: {}\n   Checksum: {}\n",
                        record.id,
                        record.status,
                        record.date.format("%Y-%m-%d %H:%M:%S UTC"),
                        record.kind,
                        record.description,
                        record.human_size(),
                        record.data_types.len(),
                        record.checksum.as_deref().unwrap_or("-"),
                    );
                } else {
                    println!(
                        "  {} {} {} ({}, {})",
                        record.id,
                        record.date.format("%Y-%m-%d %H:%M"),
                        record.kind,
                        record.status,
                        record.human_size(),
                    );
                }
            }

            println!();
            println!("Total: {} record(s)", records.len());
        }

        HistoryCommands::Remove { ids } => {
            if ids.is_empty() {
                println!("No record ids given.");
                return Ok(());
            }

            // Accept full UUIDs or the short bkp-prefixed form shown by list
            let records = ledger.read_all()?;
            let mut parsed = Vec::with_capacity(ids.len());
            for id in &ids {
                let resolved = id.parse::<RecordId>().ok().or_else(|| {
                    records
                        .iter()
                        .map(|r| r.id)
                        .find(|rid| rid.to_string() == *id)
                });
                match resolved {
                    Some(record_id) => parsed.push(record_id),
                    None => return Err(BackupError::record_not_found(id.clone())),
                }
            }

            let removed = ledger.remove(&parsed)?;
            println!("Removed {} record(s).", removed);
        }

        HistoryCommands::Clear { force } => {
            let count = ledger.entry_count()?;

            if count == 0 {
                println!("Backup history is already empty.");
                return Ok(());
            }

            if !force {
                println!("This will delete all {} history record(s).", count);
                println!("To proceed, run again with --force flag:");
                println!("  pdv-backup history clear --force");
                return Ok(());
            }

            ledger.clear()?;
            println!("Cleared {} record(s).", count);
        }
    }

    Ok(())
}
