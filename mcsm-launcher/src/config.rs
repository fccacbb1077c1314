//! Persistent launcher configuration.
//!
//! Settings live in an INI file at `<config dir>/mcsm-launcher/config.ini`:
//!
//! ```ini
//! [games]
//! season1_path = /games/S1/MinecraftStoryMode.exe
//! season2_path =
//! install_root = /games
//!
//! [saves]
//! season1_dir = ~/Documents/Telltale Games/S1
//! season2_dir = ~/Documents/Telltale Games/S2
//!
//! [download]
//! timeout = 60
//! probe_timeout = 15
//! parallel_parts = 10
//! parallel_threshold = 262144
//!
//! [packages]
//! temp_dir =
//! ```
//!
//! Missing keys fall back to defaults. Paths may start with `~`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Season;
use crate::manager::{
    DownloadConfig, ManagerConfig, DEFAULT_PARALLEL_PARTS, DEFAULT_PARALLEL_THRESHOLD,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};

/// Errors from loading, saving or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Directory holding the config file and logs.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mcsm-launcher")
}

/// Location of the config file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Directory for log files.
pub fn log_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(value: &str) -> PathBuf {
    match value.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(value),
        },
        None => PathBuf::from(value),
    }
}

/// Game install locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GamesSettings {
    /// Executable found by the last Season 1 install.
    pub season1_path: Option<PathBuf>,
    /// Executable found by the last Season 2 install.
    pub season2_path: Option<PathBuf>,
    /// Parent directory for new installs.
    pub install_root: Option<PathBuf>,
}

/// Saves directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavesSettings {
    pub season1_dir: Option<PathBuf>,
    pub season2_dir: Option<PathBuf>,
}

impl Default for SavesSettings {
    fn default() -> Self {
        Self {
            season1_dir: Season::One.default_saves_dir(),
            season2_dir: Season::Two.default_saves_dir(),
        }
    }
}

/// Transfer tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub parallel_parts: usize,
    pub parallel_threshold: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            parallel_parts: DEFAULT_PARALLEL_PARTS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Package staging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagesSettings {
    /// Staging directory for downloads. System temp when unset.
    pub temp_dir: Option<PathBuf>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub games: GamesSettings,
    pub saves: SavesSettings,
    pub download: DownloadSettings,
    pub packages: PackagesSettings,
}

impl ConfigFile {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_err)
    }

    /// Recorded executable path for `season`.
    pub fn game_path(&self, season: Season) -> Option<&Path> {
        match season {
            Season::One => self.games.season1_path.as_deref(),
            Season::Two => self.games.season2_path.as_deref(),
        }
    }

    /// Record the executable path for `season`.
    pub fn set_game_path(&mut self, season: Season, path: PathBuf) {
        match season {
            Season::One => self.games.season1_path = Some(path),
            Season::Two => self.games.season2_path = Some(path),
        }
    }

    /// Saves directory for `season`.
    pub fn saves_dir(&self, season: Season) -> Option<&Path> {
        match season {
            Season::One => self.saves.season1_dir.as_deref(),
            Season::Two => self.saves.season2_dir.as_deref(),
        }
    }

    /// Default install directory for `season`: `<install_root>/<S1|S2>`.
    pub fn install_dir(&self, season: Season) -> PathBuf {
        let root = self
            .games
            .install_root
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join("Games")))
            .unwrap_or_else(|| PathBuf::from("."));
        root.join(season.default_folder())
    }

    /// Library settings derived from this file.
    pub fn to_manager_config(&self) -> ManagerConfig {
        let download = DownloadConfig::new()
            .with_timeout_secs(self.download.timeout_secs)
            .with_probe_timeout_secs(self.download.probe_timeout_secs)
            .with_parallel_parts(self.download.parallel_parts)
            .with_parallel_threshold(self.download.parallel_threshold);

        let mut config = ManagerConfig::default().with_download(download);
        if let Some(dir) = &self.packages.temp_dir {
            config.staging_dir = dir.clone();
        }
        config
    }
}

/// A settable configuration key, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    GamesSeason1Path,
    GamesSeason2Path,
    GamesInstallRoot,
    SavesSeason1Dir,
    SavesSeason2Dir,
    DownloadTimeout,
    DownloadProbeTimeout,
    DownloadParallelParts,
    DownloadParallelThreshold,
    PackagesTempDir,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            Self::GamesSeason1Path,
            Self::GamesSeason2Path,
            Self::GamesInstallRoot,
            Self::SavesSeason1Dir,
            Self::SavesSeason2Dir,
            Self::DownloadTimeout,
            Self::DownloadProbeTimeout,
            Self::DownloadParallelParts,
            Self::DownloadParallelThreshold,
            Self::PackagesTempDir,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            Self::GamesSeason1Path | Self::GamesSeason2Path | Self::GamesInstallRoot => "games",
            Self::SavesSeason1Dir | Self::SavesSeason2Dir => "saves",
            Self::DownloadTimeout
            | Self::DownloadProbeTimeout
            | Self::DownloadParallelParts
            | Self::DownloadParallelThreshold => "download",
            Self::PackagesTempDir => "packages",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            Self::GamesSeason1Path => "season1_path",
            Self::GamesSeason2Path => "season2_path",
            Self::GamesInstallRoot => "install_root",
            Self::SavesSeason1Dir => "season1_dir",
            Self::SavesSeason2Dir => "season2_dir",
            Self::DownloadTimeout => "timeout",
            Self::DownloadProbeTimeout => "probe_timeout",
            Self::DownloadParallelParts => "parallel_parts",
            Self::DownloadParallelThreshold => "parallel_threshold",
            Self::PackagesTempDir => "temp_dir",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        fn path(p: &Option<PathBuf>) -> String {
            p.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
        }

        match self {
            Self::GamesSeason1Path => path(&config.games.season1_path),
            Self::GamesSeason2Path => path(&config.games.season2_path),
            Self::GamesInstallRoot => path(&config.games.install_root),
            Self::SavesSeason1Dir => path(&config.saves.season1_dir),
            Self::SavesSeason2Dir => path(&config.saves.season2_dir),
            Self::DownloadTimeout => config.download.timeout_secs.to_string(),
            Self::DownloadProbeTimeout => config.download.probe_timeout_secs.to_string(),
            Self::DownloadParallelParts => config.download.parallel_parts.to_string(),
            Self::DownloadParallelThreshold => config.download.parallel_threshold.to_string(),
            Self::PackagesTempDir => path(&config.packages.temp_dir),
        }
    }

    /// Parse and store `value`. An empty value clears a path setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let path = || (!value.is_empty()).then(|| expand_tilde(value));

        match self {
            Self::GamesSeason1Path => config.games.season1_path = path(),
            Self::GamesSeason2Path => config.games.season2_path = path(),
            Self::GamesInstallRoot => config.games.install_root = path(),
            Self::SavesSeason1Dir => config.saves.season1_dir = path(),
            Self::SavesSeason2Dir => config.saves.season2_dir = path(),
            Self::DownloadTimeout => config.download.timeout_secs = self.parse_positive(value)?,
            Self::DownloadProbeTimeout => {
                config.download.probe_timeout_secs = self.parse_positive(value)?
            }
            Self::DownloadParallelParts => {
                config.download.parallel_parts = self.parse_positive(value)?
            }
            Self::DownloadParallelThreshold => {
                config.download.parallel_threshold = self.parse_positive(value)?
            }
            Self::PackagesTempDir => config.packages.temp_dir = path(),
        }
        Ok(())
    }

    fn parse_positive<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: fmt::Display,
    {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        };
        let parsed: T = value.parse().map_err(|e: T::Err| invalid(e.to_string()))?;
        if parsed <= T::default() {
            return Err(invalid("must be greater than zero".to_string()));
        }
        Ok(parsed)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
