//! MCSM Launcher CLI - Command-line interface
//!
//! Installs Minecraft: Story Mode seasons and backs up or restores their
//! saves. The heavy lifting happens on background workers inside the
//! `mcsm_launcher` library; this binary renders their progress and answers
//! their questions.

mod commands;
mod error;

use std::process;

use clap::{Parser, Subcommand};
use console::style;
use mcsm_launcher::config::log_dir;
use mcsm_launcher::logging::init_logging;

use commands::backup::BackupArgs;
use commands::config::ConfigCommands;
use commands::install::InstallArgs;
use commands::restore::RestoreArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "mcsm-launcher", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download and install a season
    Install(InstallArgs),

    /// Back up a season's saves into a zip archive
    Backup(BackupArgs),

    /// Import saves from a zip archive
    Restore(RestoreArgs),

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("error:").red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let _guard = match init_logging(&log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} logging disabled: {}", style("warning:").yellow().bold(), e);
            None
        }
    };
    tracing::debug!(command = ?cli.command, "Starting");

    match cli.command {
        Commands::Install(args) => commands::install::run(args),
        Commands::Backup(args) => commands::backup::run(args),
        Commands::Restore(args) => commands::restore::run(args),
        Commands::Config(command) => commands::config::run(command),
    }
}
