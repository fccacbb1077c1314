//! CLI command implementations.

pub mod backup;
pub mod common;
pub mod config;
pub mod install;
pub mod restore;

use std::path::PathBuf;

use mcsm_launcher::catalog::Season;
use mcsm_launcher::config::ConfigFile;

use crate::error::CliError;

/// Saves directory from the CLI, else the config file, else an error.
fn resolve_saves_dir(
    cli_dir: Option<PathBuf>,
    config: &ConfigFile,
    season: Season,
) -> Result<PathBuf, CliError> {
    cli_dir
        .or_else(|| config.saves_dir(season).map(PathBuf::from))
        .ok_or_else(|| {
            CliError::Config(format!(
                "No saves directory for {}. Use --saves-dir or set saves.season{}_dir.",
                season,
                match season {
                    Season::One => 1,
                    Season::Two => 2,
                }
            ))
        })
}
