//! Error types for the transfer, install and saves subsystems.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Coarse error classification reported to the progress sink.
///
/// Presentation layers match on this instead of on [`ManagerError`] so that
/// they don't depend on the paths and reasons carried by each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection, timeout, DNS or unexpected HTTP status.
    NetworkError,
    /// The server did not honour a byte-range request.
    RangeUnsupported,
    /// Corrupt or non-zip input.
    BadArchive,
    /// Empty backup source or empty archive.
    NoFilesFound,
    /// Filesystem write/move failure.
    IoError,
    /// One or more parallel parts failed.
    PartialDownloadFailure,
}

impl ErrorKind {
    /// Get a human-readable name for the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NetworkError => "network error",
            Self::RangeUnsupported => "range requests unsupported",
            Self::BadArchive => "bad archive",
            Self::NoFilesFound => "no files found",
            Self::IoError => "I/O error",
            Self::PartialDownloadFailure => "partial download failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while downloading, installing, backing up or
/// restoring.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Connection, timeout or protocol failure.
    #[error("failed to download {url}: {reason}")]
    Network { url: String, reason: String },

    /// The server answered a range request with something other than 206.
    #[error("server does not support range requests for {url} (status {status})")]
    RangeUnsupported { url: String, status: u16 },

    /// The input is not a readable zip archive.
    #[error("{} is not a valid zip archive: {reason}", path.display())]
    BadArchive { path: PathBuf, reason: String },

    /// Nothing to back up, or nothing inside the archive.
    #[error("no files found in {}", path.display())]
    NoFilesFound { path: PathBuf },

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One or more parts of a parallel download failed.
    #[error("{} of the parallel parts failed: {failed_parts:?}", failed_parts.len())]
    PartialDownload { failed_parts: Vec<usize> },
}

impl ManagerError {
    /// Build an [`ManagerError::Io`] for the given path.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`ManagerError::Network`] from any displayable reason.
    pub fn network(url: &str, reason: impl fmt::Display) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Classify this error for the progress sink.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::RangeUnsupported { .. } => ErrorKind::RangeUnsupported,
            Self::BadArchive { .. } => ErrorKind::BadArchive,
            Self::NoFilesFound { .. } => ErrorKind::NoFilesFound,
            Self::Io { .. } => ErrorKind::IoError,
            Self::PartialDownload { .. } => ErrorKind::PartialDownloadFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManagerError::NoFilesFound {
            path: PathBuf::from("/saves/S1"),
        };
        assert_eq!(err.to_string(), "no files found in /saves/S1");
    }

    #[test]
    fn test_partial_download_display() {
        let err = ManagerError::PartialDownload {
            failed_parts: vec![2, 7],
        };
        assert!(err.to_string().contains("2 of the parallel parts failed"));
        assert!(err.to_string().contains("[2, 7]"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ManagerError::network("http://a", "refused").kind(),
            ErrorKind::NetworkError
        );
        assert_eq!(
            ManagerError::io("/a", io::Error::from(io::ErrorKind::PermissionDenied)).kind(),
            ErrorKind::IoError
        );
        assert_eq!(
            ManagerError::PartialDownload {
                failed_parts: vec![0]
            }
            .kind(),
            ErrorKind::PartialDownloadFailure
        );
    }

    #[test]
    fn test_io_source_is_exposed() {
        use std::error::Error;

        let err = ManagerError::io("/a", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.source().is_some());
    }
}
