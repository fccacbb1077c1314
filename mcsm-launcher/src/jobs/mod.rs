//! Background jobs.
//!
//! Each long-running operation runs on its own named worker thread. The
//! worker reports progress through the supplied [`ProgressSink`] and finishes
//! with exactly one terminal call: `on_complete` with a [`JobResult`] or
//! `on_error` with the error's [`ErrorKind`](crate::manager::ErrorKind).
//!
//! # Jobs
//!
//! - [`spawn_install`] - Downloads and installs a game package
//! - [`spawn_backup`] - Archives a saves directory
//! - [`spawn_restore`] - Imports a saves archive
//!
//! # Example
//!
//! ```ignore
//! use mcsm_launcher::catalog::Season;
//! use mcsm_launcher::events;
//! use mcsm_launcher::jobs::{spawn_install, InstallRequest};
//! use mcsm_launcher::manager::ManagerConfig;
//!
//! let (tx, mut rx) = events::channel();
//! let request = InstallRequest::for_season(Season::Two, "/games/S2");
//! let handle = spawn_install(request, ManagerConfig::default(), tx)?;
//! ```

use std::io;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use tracing::{error, info};

use crate::catalog::Season;
use crate::manager::normalize::NormalizationStrategy;
use crate::manager::{
    JobResult, ManagerConfig, ManagerResult, OverwritePrompt, PackageInstaller, ProgressSink,
};
use crate::saves;

/// Parameters of an install job.
pub struct InstallRequest {
    /// Package URL.
    pub url: String,
    /// Directory to install into.
    pub target_dir: PathBuf,
    /// Executable to look for after extraction.
    pub expected_file_name: String,
    /// Layout fix-ups applied after extraction.
    pub normalizers: Vec<Box<dyn NormalizationStrategy>>,
}

impl InstallRequest {
    /// Request for a catalog season.
    pub fn for_season(season: Season, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: season.url().to_string(),
            target_dir: target_dir.into(),
            expected_file_name: season.expected_executable().to_string(),
            normalizers: season.normalizers(),
        }
    }

    /// Override the package URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Download and install a package in the background.
pub fn spawn_install<S>(
    request: InstallRequest,
    config: ManagerConfig,
    sink: S,
) -> io::Result<JoinHandle<()>>
where
    S: ProgressSink + 'static,
{
    spawn_job("install", sink, move |sink| {
        let installer = PackageInstaller::new(config)?.with_strategies(request.normalizers);
        installer
            .install_from_url(
                &request.url,
                &request.target_dir,
                &request.expected_file_name,
                sink,
            )
            .map(JobResult::Installed)
    })
}

/// Archive `source_dir` into `archive_path` in the background.
pub fn spawn_backup<S>(
    source_dir: PathBuf,
    archive_path: PathBuf,
    sink: S,
) -> io::Result<JoinHandle<()>>
where
    S: ProgressSink + 'static,
{
    spawn_job("backup", sink, move |sink| {
        saves::backup(&source_dir, &archive_path, sink).map(JobResult::BackedUp)
    })
}

/// Import `archive` into `destination` in the background.
///
/// `prompt` is consulted from the worker thread when files would be
/// overwritten.
pub fn spawn_restore<S, P>(
    archive: PathBuf,
    destination: PathBuf,
    prompt: P,
    sink: S,
) -> io::Result<JoinHandle<()>>
where
    S: ProgressSink + 'static,
    P: OverwritePrompt + 'static,
{
    spawn_job("restore", sink, move |sink| {
        saves::restore(&archive, &destination, &prompt, sink).map(JobResult::Restored)
    })
}

fn spawn_job<S, F>(name: &'static str, sink: S, work: F) -> io::Result<JoinHandle<()>>
where
    S: ProgressSink + 'static,
    F: FnOnce(&S) -> ManagerResult<JobResult> + Send + 'static,
{
    thread::Builder::new()
        .name(format!("mcsm-{}", name))
        .spawn(move || {
            info!(job = name, "Job started");
            match work(&sink) {
                Ok(result) => {
                    info!(job = name, "Job finished");
                    sink.on_complete(result);
                }
                Err(e) => {
                    error!(job = name, error = %e, "Job failed");
                    sink.on_error(e.kind(), &e.to_string());
                }
            }
        })
}
