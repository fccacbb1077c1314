//! `restore` command: import a saves archive.

use std::path::PathBuf;

use clap::Args;
use mcsm_launcher::catalog::Season;
use mcsm_launcher::events;
use mcsm_launcher::jobs::spawn_restore;
use mcsm_launcher::manager::JobResult;
use mcsm_launcher::saves::RestoreOutcome;

use super::common::{
    load_config, print_success, print_warning, wait_for_job, ConflictPolicy, SeasonArg,
};
use crate::error::CliError;

/// Arguments for `restore`.
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Season whose saves to restore
    #[arg(value_enum)]
    pub season: SeasonArg,

    /// Backup archive to import
    pub archive: PathBuf,

    /// Saves directory override
    #[arg(long)]
    pub saves_dir: Option<PathBuf>,

    /// Overwrite existing files without asking
    #[arg(long, short)]
    pub yes: bool,
}

/// Run the restore command.
pub fn run(args: RestoreArgs) -> Result<(), CliError> {
    let season = Season::from(args.season);
    let config = load_config();
    let destination = super::resolve_saves_dir(args.saves_dir, &config, season)?;

    let policy = if args.yes {
        ConflictPolicy::Overwrite
    } else {
        ConflictPolicy::Ask
    };

    let (tx, rx) = events::channel();
    let prompt = tx.prompt();
    let handle =
        spawn_restore(args.archive, destination.clone(), prompt, tx).map_err(CliError::Spawn)?;

    let JobResult::Restored(outcome) = wait_for_job(handle, rx, policy)? else {
        return Err(CliError::WorkerLost);
    };

    match &outcome {
        RestoreOutcome::Imported { copied, skipped } => {
            if *copied > 0 {
                print_success(&format!("Imported {} save files to {}", copied, destination.display()));
            } else {
                print_warning(&outcome.status_message());
            }
            for path in skipped {
                print_warning(&format!("Skipped {}", path.display()));
            }
        }
        RestoreOutcome::Cancelled { .. } => print_warning(&outcome.status_message()),
    }

    Ok(())
}
