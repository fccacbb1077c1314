//! Transfer planning: strategy selection and byte-range partitioning.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::manager::config::DownloadConfig;

/// What a metadata probe learned about a remote resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    /// `Content-Length`, if the server sent one.
    pub total_size: Option<u64>,
    /// Whether `Accept-Ranges` advertised byte ranges.
    pub accepts_ranges: bool,
}

/// How a transfer is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One GET streamed straight into the destination.
    Single,
    /// Concurrent range requests into part files, concatenated afterwards.
    Parallel,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single-stream"),
            Self::Parallel => f.write_str("parallel"),
        }
    }
}

/// One contiguous byte range of a parallel transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePart {
    /// Position in the concatenation order.
    pub index: usize,
    /// First byte (inclusive).
    pub start: u64,
    /// Last byte (inclusive).
    pub end: u64,
    /// File receiving this range.
    pub path: PathBuf,
}

impl RangePart {
    /// Number of bytes covered by this part. Never zero.
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the HTTP `Range` header.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// A single download invocation.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Source URL.
    pub url: String,
    /// Final file.
    pub destination: PathBuf,
    /// Probed size, if known.
    pub total_size: Option<u64>,
    /// Range plan, empty for single-stream transfers.
    pub parts: Vec<RangePart>,
    /// Chosen strategy.
    pub strategy: Strategy,
}

impl TransferJob {
    /// Plan a transfer from probe results.
    ///
    /// Parallel is chosen only when ranges are supported and the size is
    /// known and strictly above the threshold.
    pub fn plan(url: &str, destination: &Path, info: ResourceInfo, config: &DownloadConfig) -> Self {
        let parallel_size = info
            .total_size
            .filter(|&total| info.accepts_ranges && total > config.parallel_threshold);

        match parallel_size {
            Some(total) => Self {
                url: url.to_string(),
                destination: destination.to_path_buf(),
                total_size: Some(total),
                parts: plan_ranges(
                    total,
                    config.parallel_parts,
                    config.parallel_threshold,
                    destination,
                ),
                strategy: Strategy::Parallel,
            },
            None => Self::single(url, destination, info.total_size),
        }
    }

    /// A single-stream job, used directly and as the fallback.
    pub fn single(url: &str, destination: &Path, total_size: Option<u64>) -> Self {
        Self {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            total_size,
            parts: Vec::new(),
            strategy: Strategy::Single,
        }
    }

    /// Remove every part file of this job. Missing files are fine.
    pub fn discard_parts(&self) {
        for part in &self.parts {
            remove_if_exists(&part.path);
        }
    }

    /// Remove the destination file if present.
    pub fn discard_destination(&self) {
        remove_if_exists(&self.destination);
    }
}

/// Partition `[0, total)` into at most `max_parts` contiguous ranges.
///
/// Every part is at least `min_part_size` bytes (except when `total` itself is
/// smaller) and the last part absorbs the remainder. Part files are named
/// `<destination>.part<index>`.
pub fn plan_ranges(
    total: u64,
    max_parts: usize,
    min_part_size: u64,
    destination: &Path,
) -> Vec<RangePart> {
    if total == 0 {
        return Vec::new();
    }

    let max_parts = max_parts.max(1) as u64;
    let part_size = (total / max_parts).max(min_part_size).max(1);
    let count = (total / part_size).clamp(1, max_parts);

    (0..count)
        .map(|i| {
            let start = i * part_size;
            let end = if i + 1 == count {
                total - 1
            } else {
                start + part_size - 1
            };
            RangePart {
                index: i as usize,
                start,
                end,
                path: part_path(destination, i as usize),
            }
        })
        .collect()
}

/// Path of the file holding part `index` of `destination`.
pub fn part_path(destination: &Path, index: usize) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(format!(".part{}", index));
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove file"),
    }
}
