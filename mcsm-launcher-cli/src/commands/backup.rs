//! `backup` command: archive a season's saves.

use std::path::PathBuf;

use clap::Args;
use mcsm_launcher::catalog::Season;
use mcsm_launcher::events;
use mcsm_launcher::jobs::spawn_backup;
use mcsm_launcher::manager::JobResult;
use mcsm_launcher::saves::default_backup_name;

use super::common::{load_config, print_success, wait_for_job, ConflictPolicy, SeasonArg};
use crate::error::CliError;

/// Arguments for `backup`.
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Season whose saves to back up
    #[arg(value_enum)]
    pub season: SeasonArg,

    /// Archive to write (defaults to <Documents>/Season_N_saves_backup.zip)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Saves directory override
    #[arg(long)]
    pub saves_dir: Option<PathBuf>,
}

/// Run the backup command.
pub fn run(args: BackupArgs) -> Result<(), CliError> {
    let season = Season::from(args.season);
    let config = load_config();

    let source = super::resolve_saves_dir(args.saves_dir, &config, season)?;
    let output = args.output.unwrap_or_else(|| {
        dirs::document_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(default_backup_name(season.label()))
    });

    let (tx, rx) = events::channel();
    let handle = spawn_backup(source, output, tx).map_err(CliError::Spawn)?;

    match wait_for_job(handle, rx, ConflictPolicy::Ask)? {
        JobResult::BackedUp(backup) => {
            print_success(&format!(
                "Backed up {} files to {}",
                backup.files,
                backup.archive_path.display()
            ));
            Ok(())
        }
        _ => Err(CliError::WorkerLost),
    }
}
