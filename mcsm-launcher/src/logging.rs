//! Logging setup.
//!
//! Logs go to a daily-rolling file through a non-blocking writer. The filter
//! defaults to `mcsm_launcher=info` and can be overridden with `RUST_LOG`.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::Subscriber;
use tracing_subscriber::EnvFilter;

/// File name prefix of the rolling log.
pub const LOG_FILE_NAME: &str = "mcsm-launcher.log";

/// Default filter directive.
pub const DEFAULT_FILTER: &str = "mcsm_launcher=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

/// Install the global subscriber writing into `log_dir`.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDir {
        path: log_dir.display().to_string(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_names(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(guard)
}
