//! CLI error type.

use std::io;

use mcsm_launcher::config::ConfigError;
use mcsm_launcher::manager::ErrorKind;
use thiserror::Error;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error("{kind}: {message}")]
    Job { kind: ErrorKind, message: String },

    #[error("Failed to start background job: {0}")]
    Spawn(#[source] io::Error),

    #[error("Background job stopped without reporting a result")]
    WorkerLost,

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}
