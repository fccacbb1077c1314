//! Saves archive restore with conflict detection.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::entries::{collect_entries, ConflictSet};
use crate::manager::download::percent_of;
use crate::manager::{
    ArchiveExtractor, ManagerError, ManagerResult, OverwritePrompt, ProgressSink, ZipExtractor,
};

/// Status line reported when the overwrite prompt is declined.
pub const IMPORT_CANCELLED_MESSAGE: &str = "Import cancelled by user.";

/// Outcome of a restore that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Files were copied into the destination.
    Imported {
        /// Number of files copied.
        copied: usize,
        /// Relative paths that could not be copied.
        skipped: Vec<PathBuf>,
    },
    /// The overwrite prompt was declined; the destination is untouched.
    Cancelled {
        /// The files that would have been overwritten.
        conflicts: ConflictSet,
    },
}

impl RestoreOutcome {
    /// Final status line for this outcome.
    pub fn status_message(&self) -> String {
        match self {
            Self::Imported { copied: 0, .. } => "No save files were imported.".to_string(),
            Self::Imported { copied, .. } => format!("Imported {} save files.", copied),
            Self::Cancelled { .. } => IMPORT_CANCELLED_MESSAGE.to_string(),
        }
    }
}

/// Import `archive` into `destination`.
///
/// The archive is unpacked into a scratch directory first. When any file
/// would overwrite an existing one, `prompt` decides; on a decline nothing in
/// `destination` is written. Per-file copy failures are logged and listed in
/// the outcome instead of aborting the import.
pub fn restore(
    archive: &Path,
    destination: &Path,
    prompt: &dyn OverwritePrompt,
    sink: &dyn ProgressSink,
) -> ManagerResult<RestoreOutcome> {
    sink.on_progress(0, "Importing saves...");

    let scratch = TempDir::new().map_err(|e| ManagerError::io(std::env::temp_dir(), e))?;
    ZipExtractor::new().extract(archive, scratch.path())?;

    let entries = collect_entries(scratch.path())?;
    if entries.is_empty() {
        return Err(ManagerError::NoFilesFound {
            path: archive.to_path_buf(),
        });
    }

    let conflicts = ConflictSet::detect(destination, &entries);
    if !conflicts.is_empty() {
        info!(destination = %destination.display(), conflicts = conflicts.len(), "Restore would overwrite files");
        if !prompt.ask_overwrite(&conflicts) {
            info!("Restore declined");
            sink.on_progress(0, IMPORT_CANCELLED_MESSAGE);
            return Ok(RestoreOutcome::Cancelled { conflicts });
        }
    }

    fs::create_dir_all(destination).map_err(|e| ManagerError::io(destination, e))?;

    let total = entries.len() as u64;
    let mut copied = 0;
    let mut skipped = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        let target = destination.join(&entry.relative);
        match copy_file(&entry.source, &target) {
            Ok(()) => {
                copied += 1;
                debug!(path = %entry.relative.display(), "Restored file");
                if copied % 10 == 0 {
                    sink.on_progress(
                        percent_of(i as u64 + 1, total),
                        &format!("Imported {} files...", copied),
                    );
                }
            }
            Err(e) => {
                warn!(path = %entry.relative.display(), error = %e, "Skipping file that could not be restored");
                skipped.push(entry.relative.clone());
            }
        }
    }

    let outcome = RestoreOutcome::Imported { copied, skipped };
    info!(destination = %destination.display(), copied, "Restore complete");
    sink.on_progress(100, &outcome.status_message());

    Ok(outcome)
}

fn copy_file(source: &Path, target: &Path) -> ManagerResult<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::io(parent, e))?;
    }
    fs::copy(source, target).map_err(|e| ManagerError::io(target, e))?;
    Ok(())
}
