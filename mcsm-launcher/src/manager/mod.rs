//! Package manager for downloading and installing game packages.
//!
//! This module covers everything between a download URL and an installed
//! game directory:
//!
//! - [`download`] moves one remote archive to disk, in parallel byte ranges
//!   when the server allows it
//! - [`ZipExtractor`] unpacks it
//! - [`normalize`] flattens known nested layouts
//! - [`ArchiveInstaller`] and [`PackageInstaller`] tie the steps together
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mcsm_launcher::manager::{ManagerConfig, NullSink, PackageInstaller};
//!
//! let installer = PackageInstaller::new(ManagerConfig::default())?;
//! let result = installer.install_from_url(
//!     "https://example.com/game.zip",
//!     Path::new("/games/S1"),
//!     "MinecraftStoryMode.exe",
//!     &NullSink,
//! )?;
//! println!("{}", result.status_message());
//! ```

mod config;
pub mod download;
mod error;
mod extractor;
mod installer;
pub mod normalize;
mod traits;

pub use config::{
    DownloadConfig, ManagerConfig, DEFAULT_PARALLEL_PARTS, DEFAULT_PARALLEL_THRESHOLD,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
pub use error::{ErrorKind, ManagerError, ManagerResult};
pub use extractor::ZipExtractor;
pub use installer::{locate_file, ArchiveInstaller, InstallResult, InstallStage, PackageInstaller};
pub use normalize::{KeywordStrategy, NestedChainStrategy, NormalizationStrategy};
pub use traits::{ArchiveExtractor, JobResult, NullSink, OverwritePrompt, ProgressSink, RangeFetcher};

#[cfg(test)]
pub(crate) use extractor::test_support;
