//! Collaborator interfaces for the background subsystems.
//!
//! The core never touches presentation state. It talks to the outside world
//! through these traits only:
//!
//! - [`ProgressSink`] receives percentages, status lines and terminal results
//! - [`OverwritePrompt`] answers the restore conflict question
//! - [`RangeFetcher`] moves bytes from a remote resource into local files
//! - [`ArchiveExtractor`] unpacks archives for the installer and restore engine
//!
//! All of them may be invoked from worker threads, so implementations must be
//! `Send + Sync` and marshal onto their own thread if they need to.

use std::path::Path;

use super::download::{RangePart, ResourceInfo};
use super::error::{ErrorKind, ManagerResult};
use super::installer::InstallResult;
use crate::saves::{BackupResult, ConflictSet, RestoreOutcome};

/// Terminal result of a background job.
#[derive(Debug, Clone)]
pub enum JobResult {
    /// A package was downloaded and installed.
    Installed(InstallResult),
    /// A saves directory was archived.
    BackedUp(BackupResult),
    /// An archive was imported (or the import was declined).
    Restored(RestoreOutcome),
}

/// Receiver of progress and status updates.
///
/// Only `on_progress` is called by the components themselves; the job
/// runners in [`crate::jobs`] deliver the terminal `on_complete`/`on_error`.
pub trait ProgressSink: Send + Sync {
    /// Report a percentage (0..=100) and a human-readable status line.
    fn on_progress(&self, percent: u8, message: &str);

    /// Report successful completion.
    fn on_complete(&self, _result: JobResult) {}

    /// Report a terminal failure.
    fn on_error(&self, _kind: ErrorKind, _message: &str) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&self, _percent: u8, _message: &str) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for std::sync::Arc<S> {
    fn on_progress(&self, percent: u8, message: &str) {
        (**self).on_progress(percent, message)
    }

    fn on_complete(&self, result: JobResult) {
        (**self).on_complete(result)
    }

    fn on_error(&self, kind: ErrorKind, message: &str) {
        (**self).on_error(kind, message)
    }
}

/// Decision maker for restore conflicts.
///
/// Called on the worker thread, which blocks until an answer is available.
/// Returning `false` aborts the restore without touching the destination.
pub trait OverwritePrompt: Send + Sync {
    /// Decide whether the listed destination files may be overwritten.
    fn ask_overwrite(&self, conflicts: &ConflictSet) -> bool;
}

impl<F> OverwritePrompt for F
where
    F: Fn(&ConflictSet) -> bool + Send + Sync,
{
    fn ask_overwrite(&self, conflicts: &ConflictSet) -> bool {
        self(conflicts)
    }
}

/// Trait for unpacking archives.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive_path` into `dest_dir`, returning the number of files
    /// written.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize>;
}

/// Transport used by the transfer coordinator.
///
/// Every method creates or overwrites exactly one local file and must be safe
/// to call concurrently against disjoint output paths.
pub trait RangeFetcher: Send + Sync {
    /// Lightweight metadata request. Never fails: an unreachable or
    /// uncooperative server simply yields an unknown size without ranges.
    fn probe(&self, url: &str) -> ResourceInfo;

    /// Fetch one byte range into `part.path`, calling `on_bytes` with every
    /// increment. Returns the number of bytes written.
    fn fetch_range(
        &self,
        url: &str,
        part: &RangePart,
        on_bytes: &(dyn Fn(u64) + Sync),
    ) -> ManagerResult<u64>;

    /// Fetch the whole resource into `dest`, calling `on_bytes` with the
    /// running total and the response's content length, if any.
    fn fetch_whole(
        &self,
        url: &str,
        dest: &Path,
        on_bytes: &mut dyn FnMut(u64, Option<u64>),
    ) -> ManagerResult<u64>;
}
