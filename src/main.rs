use anyhow::Result;
use clap::{Parser, Subcommand};

use pdv_backup::cli::{
    handle_backup_command, handle_history_command, BackupCommands, HistoryCommands,
};
use pdv_backup::config::{paths::AppPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "pdv-backup",
    version,
    about = "Backup and restore engine for a small-retail point-of-sale system",
    long_about = "pdv-backup collects the entire state of a point-of-sale \
                  installation into a single versioned, integrity-checked \
                  artifact, and can reconstruct the full system state from \
                  such an artifact. It also keeps an auditable history of \
                  past backup attempts."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backup management commands
    #[command(subcommand, alias = "bkp")]
    Backup(BackupCommands),

    /// Backup history commands
    #[command(subcommand, alias = "hist")]
    History(HistoryCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = AppPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::Backup(cmd) => {
            handle_backup_command(&paths, &settings, cmd)?;
        }
        Commands::History(cmd) => {
            handle_history_command(&paths, cmd)?;
        }
        Commands::Config => {
            println!("Configuration");
            println!("=============");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("History ledger: {}", paths.history_file().display());
            println!();
            println!("Auto backup: {}", if settings.auto_backup.enabled { "enabled" } else { "disabled" });
            println!("Frequency: {}", settings.auto_backup.frequency);
            println!("Scheduled time: {}", settings.auto_backup.time_of_day);
            println!("Retention: {} days", settings.auto_backup.retention_days);
        }
    }

    Ok(())
}
