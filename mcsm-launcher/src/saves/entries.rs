//! Directory enumeration and conflict sets.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::manager::{ManagerError, ManagerResult};

/// Number of conflicting paths listed before the rest is summarized.
pub const MAX_LISTED_CONFLICTS: usize = 50;

/// A file to be archived or restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Absolute location on disk.
    pub source: PathBuf,
    /// Location relative to the enumerated root.
    pub relative: PathBuf,
}

impl ArchiveEntry {
    /// Entry name inside a zip: the relative path with `/` separators.
    pub fn archive_name(&self) -> String {
        self.relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Every regular file under `root`, in file name order.
///
/// A missing root yields an empty list.
pub fn collect_entries(root: &Path) -> ManagerResult<Vec<ArchiveEntry>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            ManagerError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        entries.push(ArchiveEntry {
            source: entry.into_path(),
            relative,
        });
    }

    Ok(entries)
}

/// Destination files a restore would overwrite.
///
/// Paths are relative to the destination and kept in sorted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSet {
    destination: PathBuf,
    paths: Vec<PathBuf>,
}

impl ConflictSet {
    /// Build a set for `destination` from relative paths.
    pub fn new(destination: impl Into<PathBuf>, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut paths: Vec<PathBuf> = paths.into_iter().collect();
        paths.sort();
        paths.dedup();
        Self {
            destination: destination.into(),
            paths,
        }
    }

    /// Find which `entries` already exist under `destination`.
    pub fn detect(destination: &Path, entries: &[ArchiveEntry]) -> Self {
        Self::new(
            destination,
            entries
                .iter()
                .filter(|e| destination.join(&e.relative).exists())
                .map(|e| e.relative.clone()),
        )
    }

    /// The directory being restored into.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The conflicting relative paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Up to [`MAX_LISTED_CONFLICTS`] paths, one per line, followed by
    /// `... and N more` when the list is longer.
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = self
            .paths
            .iter()
            .take(MAX_LISTED_CONFLICTS)
            .map(|p| p.display().to_string())
            .collect();
        if self.paths.len() > MAX_LISTED_CONFLICTS {
            lines.push(format!("... and {} more", self.paths.len() - MAX_LISTED_CONFLICTS));
        }
        lines.join("\n")
    }
}
