//! Common types and utilities shared across CLI commands.

use std::thread::JoinHandle;

use clap::ValueEnum;
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use mcsm_launcher::catalog::Season;
use mcsm_launcher::config::ConfigFile;
use mcsm_launcher::events::{Event, EventReceiver};
use mcsm_launcher::manager::JobResult;
use mcsm_launcher::saves::ConflictSet;

use crate::error::CliError;

/// Season selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SeasonArg {
    /// Season 1
    #[value(name = "1", alias = "s1")]
    One,
    /// Season 2
    #[value(name = "2", alias = "s2")]
    Two,
}

impl From<SeasonArg> for Season {
    fn from(arg: SeasonArg) -> Self {
        match arg {
            SeasonArg::One => Season::One,
            SeasonArg::Two => Season::Two,
        }
    }
}

/// How restore conflicts are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Ask interactively.
    Ask,
    /// Overwrite without asking.
    Overwrite,
}

impl ConflictPolicy {
    fn decide(&self, conflicts: &ConflictSet) -> Result<bool, CliError> {
        match self {
            Self::Overwrite => Ok(true),
            Self::Ask => {
                println!(
                    "The following save files already exist and will be overwritten in:\n{}\n",
                    conflicts.destination().display()
                );
                println!("{}\n", conflicts.summary());
                Ok(Confirm::new()
                    .with_prompt("Proceed and overwrite these files?")
                    .default(false)
                    .show_default(true)
                    .interact()?)
            }
        }
    }
}

/// Load config for read-only use.
///
/// A file that fails to parse is reported and defaults are used instead.
/// Commands that write the config back must use [`ConfigFile::load`].
pub fn load_config() -> ConfigFile {
    match ConfigFile::load() {
        Ok(config) => config,
        Err(e) => {
            print_warning(&format!("{}; using defaults", e));
            ConfigFile::default()
        }
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.dim} [{elapsed_precise}] [{bar:30.yellow/dim}] {pos:>3}% {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Drive a background job to completion.
///
/// Renders progress events, answers overwrite requests with `policy`, and
/// returns the job's terminal result. This is the only place the CLI blocks
/// on the worker.
pub fn wait_for_job(
    handle: JoinHandle<()>,
    mut events: EventReceiver,
    policy: ConflictPolicy,
) -> Result<JobResult, CliError> {
    let bar = ProgressBar::new(100);
    bar.set_style(progress_style());

    let mut outcome = Err(CliError::WorkerLost);
    while let Some(event) = events.blocking_recv() {
        match event {
            Event::Progress { percent, message } => {
                bar.set_position(u64::from(percent));
                bar.set_message(message);
            }
            Event::OverwriteRequested(request) => {
                let allow = bar.suspend(|| policy.decide(request.conflicts()));
                match allow {
                    Ok(allow) => request.respond(allow),
                    Err(e) => {
                        request.respond(false);
                        outcome = Err(e);
                    }
                }
            }
            Event::Completed(result) => {
                bar.finish_and_clear();
                if matches!(outcome, Err(CliError::WorkerLost)) {
                    outcome = Ok(result);
                }
            }
            Event::Failed { kind, message } => {
                bar.abandon();
                outcome = Err(CliError::Job { kind, message });
            }
        }
    }

    if handle.join().is_err() {
        return Err(CliError::WorkerLost);
    }
    outcome
}

/// Print a success line.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning line.
pub fn print_warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}
