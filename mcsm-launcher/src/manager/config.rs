//! Runtime settings for downloads and installs.

use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for data requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default timeout for the metadata probe in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;

/// Maximum number of concurrent range requests for one download.
pub const DEFAULT_PARALLEL_PARTS: usize = 10;

/// Resources at or below this size are always fetched as a single stream (256 KiB).
pub const DEFAULT_PARALLEL_THRESHOLD: u64 = 256 * 1024;

/// Settings for the transfer coordinator and its fetchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Timeout for GET requests.
    pub timeout: Duration,

    /// Timeout for the HEAD probe.
    pub probe_timeout: Duration,

    /// Upper bound on the number of parallel parts.
    pub parallel_parts: usize,

    /// Minimum size (exclusive) for the parallel strategy.
    ///
    /// Also used as the minimum part size.
    pub parallel_threshold: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            parallel_parts: DEFAULT_PARALLEL_PARTS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl DownloadConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the GET timeout in seconds.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set the probe timeout in seconds.
    pub fn with_probe_timeout_secs(mut self, secs: u64) -> Self {
        self.probe_timeout = Duration::from_secs(secs);
        self
    }

    /// Set the maximum number of parallel parts (minimum 1).
    pub fn with_parallel_parts(mut self, parts: usize) -> Self {
        self.parallel_parts = parts.max(1);
        self
    }

    /// Set the parallel threshold in bytes (minimum 1).
    pub fn with_parallel_threshold(mut self, bytes: u64) -> Self {
        self.parallel_threshold = bytes.max(1);
        self
    }
}

/// Configuration for the package installer.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Directory for temporary downloads.
    pub staging_dir: PathBuf,

    /// Download settings.
    pub download: DownloadConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            staging_dir: std::env::temp_dir().join("mcsm-launcher-staging"),
            download: DownloadConfig::default(),
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration with the given staging directory.
    pub fn new(staging_dir: PathBuf) -> Self {
        Self {
            staging_dir,
            ..Default::default()
        }
    }

    /// Set the download settings.
    pub fn with_download(mut self, download: DownloadConfig) -> Self {
        self.download = download;
        self
    }
}
