//! `install` command: download and install a season.

use std::path::{Path, PathBuf};

use clap::Args;
use mcsm_launcher::catalog::Season;
use mcsm_launcher::config::{config_file_path, ConfigFile};
use mcsm_launcher::events;
use mcsm_launcher::jobs::{spawn_install, InstallRequest};
use mcsm_launcher::manager::JobResult;

use super::common::{print_success, print_warning, wait_for_job, ConflictPolicy, SeasonArg};
use crate::error::CliError;

/// Arguments for `install`.
#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Season to install
    #[arg(value_enum)]
    pub season: SeasonArg,

    /// Install directory (defaults to <install_root>/S1 or S2)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Package URL override
    #[arg(long)]
    pub url: Option<String>,
}

/// Run the install command.
pub fn run(args: InstallArgs) -> Result<(), CliError> {
    let season = Season::from(args.season);
    // The found executable is written back, so a broken file must not be
    // replaced with defaults.
    let config = ConfigFile::load()?;

    let target_dir = args.dir.unwrap_or_else(|| config.install_dir(season));
    let mut request = InstallRequest::for_season(season, &target_dir);
    if let Some(url) = args.url {
        request = request.with_url(url);
    }

    println!("Installing {} into {}", season, target_dir.display());

    let (tx, rx) = events::channel();
    let handle = spawn_install(request, config.to_manager_config(), tx).map_err(CliError::Spawn)?;
    let result = wait_for_job(handle, rx, ConflictPolicy::Ask)?;

    let JobResult::Installed(install) = result else {
        return Err(CliError::WorkerLost);
    };

    match &install.executable {
        Some(exe) => {
            remember_game_path(&config_file_path(), season, exe)?;
            print_success(&install.status_message());
        }
        None => print_warning(&install.status_message()),
    }

    Ok(())
}

/// Record an installed executable in the config file at `path`.
fn remember_game_path(path: &Path, season: Season, exe: &Path) -> Result<(), CliError> {
    let mut config = ConfigFile::load_from(path)?;
    config.set_game_path(season, exe.to_path_buf());
    config.save_to(path)?;
    Ok(())
}
