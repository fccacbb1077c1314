//! Package installer for downloading and installing game packages.
//!
//! This module orchestrates the full installation workflow:
//! 1. Download the archive into a staging file
//! 2. Extract it into the target directory
//! 3. Normalize known nested layouts
//! 4. Locate the expected executable
//! 5. Remove the staging file

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::config::ManagerConfig;
use super::download::{HttpDownloader, TransferCoordinator};
use super::error::{ManagerError, ManagerResult};
use super::extractor::ZipExtractor;
use super::normalize::{normalize, NormalizationStrategy};
use super::traits::{ArchiveExtractor, ProgressSink, RangeFetcher};

/// Installation stages for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Downloading the archive.
    Downloading,
    /// Extracting archive contents.
    Extracting,
    /// Rewriting nested layouts.
    Normalizing,
    /// Scanning for the expected executable.
    Locating,
    /// Installation complete.
    Complete,
}

impl InstallStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Downloading => "Downloading",
            Self::Extracting => "Extracting",
            Self::Normalizing => "Normalizing",
            Self::Locating => "Locating executable",
            Self::Complete => "Complete",
        }
    }
}

/// Result of a package installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Directory the package was installed into.
    pub target_dir: PathBuf,
    /// Path of the expected executable, if it was found.
    pub executable: Option<PathBuf>,
    /// Whether a normalization strategy rewrote the layout.
    pub normalized: bool,
}

impl InstallResult {
    /// Final status line for this result.
    pub fn status_message(&self) -> String {
        match &self.executable {
            Some(exe) => format!("Installed and found: {}", exe.display()),
            None => "Install complete, executable not found.".to_string(),
        }
    }
}

/// Installs a local archive into a directory.
pub struct ArchiveInstaller<E: ArchiveExtractor = ZipExtractor> {
    extractor: E,
    strategies: Vec<Box<dyn NormalizationStrategy>>,
}

impl ArchiveInstaller<ZipExtractor> {
    /// Create an installer for zip archives with no normalization.
    pub fn new() -> Self {
        Self::with_extractor(ZipExtractor::new())
    }
}

impl Default for ArchiveInstaller<ZipExtractor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ArchiveExtractor> ArchiveInstaller<E> {
    /// Create an installer with a custom extractor.
    pub fn with_extractor(extractor: E) -> Self {
        Self {
            extractor,
            strategies: Vec::new(),
        }
    }

    /// Set the normalization strategies, tried in order.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn NormalizationStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Install `archive` into `target_dir`.
    ///
    /// A missing executable is not an error; it shows up as
    /// `executable: None` in the result.
    pub fn install(
        &self,
        archive: &Path,
        target_dir: &Path,
        expected_file_name: &str,
    ) -> ManagerResult<InstallResult> {
        let files = self.extractor.extract(archive, target_dir)?;
        info!(
            archive = %archive.display(),
            target = %target_dir.display(),
            files,
            "Extracted package"
        );

        debug!(stage = InstallStage::Normalizing.name(), strategies = self.strategies.len(), "Checking layout");
        let normalized = normalize(target_dir, &self.strategies);

        debug!(stage = InstallStage::Locating.name(), name = expected_file_name, "Scanning for executable");
        let executable = locate_file(target_dir, expected_file_name);

        match &executable {
            Some(path) => info!(path = %path.display(), "Found executable"),
            None => warn!(name = expected_file_name, target = %target_dir.display(), "Executable not found"),
        }

        Ok(InstallResult {
            target_dir: target_dir.to_path_buf(),
            executable,
            normalized,
        })
    }
}

/// Find the first file under `root` whose name equals `file_name`, ignoring
/// ASCII case. Directories are walked in file name order.
pub fn locate_file(root: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .find(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(file_name))
        .map(|e| e.into_path())
}

/// Package installer.
///
/// Handles the complete installation workflow: download through the
/// transfer coordinator, then extraction, normalization and lookup through
/// an [`ArchiveInstaller`].
pub struct PackageInstaller<F: RangeFetcher = HttpDownloader> {
    coordinator: TransferCoordinator<F>,
    installer: ArchiveInstaller,
    staging_dir: PathBuf,
}

impl PackageInstaller<HttpDownloader> {
    /// Create a new package installer over HTTP.
    pub fn new(config: ManagerConfig) -> ManagerResult<Self> {
        let coordinator = TransferCoordinator::new(config.download)?;
        Ok(Self {
            coordinator,
            installer: ArchiveInstaller::new(),
            staging_dir: config.staging_dir,
        })
    }
}

impl<F: RangeFetcher> PackageInstaller<F> {
    /// Create a package installer from its parts.
    pub fn with_coordinator(coordinator: TransferCoordinator<F>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            coordinator,
            installer: ArchiveInstaller::new(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Set the normalization strategies used after extraction.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn NormalizationStrategy>>) -> Self {
        self.installer = self.installer.with_strategies(strategies);
        self
    }

    /// Get the staging directory.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Download `url` and install it into `target_dir`.
    ///
    /// The archive is staged in a temporary file that is removed on every
    /// path. Status lines go to `sink`.
    pub fn install_from_url(
        &self,
        url: &str,
        target_dir: &Path,
        expected_file_name: &str,
        sink: &dyn ProgressSink,
    ) -> ManagerResult<InstallResult> {
        fs::create_dir_all(&self.staging_dir).map_err(|e| ManagerError::io(&self.staging_dir, e))?;

        let staged = tempfile::Builder::new()
            .prefix("mcsm-package-")
            .suffix(".zip")
            .tempfile_in(&self.staging_dir)
            .map_err(|e| ManagerError::io(&self.staging_dir, e))?
            .into_temp_path();
        debug!(stage = InstallStage::Downloading.name(), path = %staged.display(), "Staging download");

        let outcome = self.coordinator.fetch(url, &staged, sink)?;
        debug!(stage = InstallStage::Extracting.name(), bytes = outcome.bytes, "Installing staged archive");

        let result = self.installer.install(&staged, target_dir, expected_file_name);

        if let Err(e) = staged.close() {
            debug!(error = %e, "Staged archive already removed");
        }

        let result = result?;
        sink.on_progress(100, "Extract complete, scanning for executable...");
        sink.on_progress(100, &result.status_message());
        debug!(stage = InstallStage::Complete.name(), "Install finished");

        Ok(result)
    }
}
