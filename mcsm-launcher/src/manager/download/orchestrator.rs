//! Transfer coordinator.
//!
//! This module provides the high-level orchestration for downloading one
//! remote resource: probe, strategy choice, parallel execution, and the single
//! fallback to a plain stream.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::http::HttpDownloader;
use super::plan::{Strategy, TransferJob};
use super::strategy::{ParallelRangeStrategy, SingleStreamStrategy, TransferStrategy};
use crate::manager::config::DownloadConfig;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::{ProgressSink, RangeFetcher};

/// Status line reported when a transfer completes.
pub const DOWNLOAD_COMPLETE_MESSAGE: &str = "Download complete, extracting...";

/// Result of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    /// The downloaded file.
    pub path: PathBuf,
    /// Its size in bytes.
    pub bytes: u64,
    /// The strategy that produced the file.
    pub strategy: Strategy,
    /// Whether a failed parallel attempt was retried as a single stream.
    pub fell_back: bool,
}

/// Download coordinator.
///
/// Decides between single-stream and parallel transfers, runs the chosen
/// strategy, and retries a failed parallel transfer once as a single stream.
/// Blocking: call it from a worker thread, never from a presentation thread.
/// There is no cancellation.
pub struct TransferCoordinator<F: RangeFetcher = HttpDownloader> {
    fetcher: F,
    config: DownloadConfig,
}

impl TransferCoordinator<HttpDownloader> {
    /// Create a coordinator using HTTP with the given settings.
    pub fn new(config: DownloadConfig) -> ManagerResult<Self> {
        let fetcher = HttpDownloader::new(&config)?;
        Ok(Self { fetcher, config })
    }
}

impl<F: RangeFetcher> TransferCoordinator<F> {
    /// Create a coordinator with a custom fetcher.
    pub fn with_fetcher(fetcher: F, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Get the download settings.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download `url` into `destination`.
    ///
    /// Progress goes to `sink`. On success the sink sees 100% with a
    /// transition message; on failure it sees 0% with an error message, and
    /// neither the destination nor any part file is left on disk.
    pub fn fetch(
        &self,
        url: &str,
        destination: &Path,
        sink: &dyn ProgressSink,
    ) -> ManagerResult<TransferOutcome> {
        let info = self.fetcher.probe(url);
        let job = TransferJob::plan(url, destination, info, &self.config);
        info!(
            url,
            strategy = %job.strategy,
            parts = job.parts.len(),
            total_size = ?job.total_size,
            "Starting transfer"
        );
        sink.on_progress(0, "Starting download...");

        match self.run(&job, sink) {
            Ok(outcome) => {
                info!(url, bytes = outcome.bytes, fell_back = outcome.fell_back, "Transfer complete");
                sink.on_progress(100, DOWNLOAD_COMPLETE_MESSAGE);
                Ok(outcome)
            }
            Err(e) => {
                job.discard_parts();
                job.discard_destination();
                warn!(url, error = %e, "Transfer failed");
                sink.on_progress(0, "Error during download");
                Err(e)
            }
        }
    }

    fn run(&self, job: &TransferJob, sink: &dyn ProgressSink) -> ManagerResult<TransferOutcome> {
        if job.strategy == Strategy::Single {
            let bytes = self.execute(&SingleStreamStrategy::new(), job, sink)?;
            return Ok(TransferOutcome {
                path: job.destination.clone(),
                bytes,
                strategy: Strategy::Single,
                fell_back: false,
            });
        }

        match self.execute(&ParallelRangeStrategy::new(), job, sink) {
            Ok(bytes) => Ok(TransferOutcome {
                path: job.destination.clone(),
                bytes,
                strategy: Strategy::Parallel,
                fell_back: false,
            }),
            Err(e) => {
                warn!(url = %job.url, error = %e, "Parallel download failed, falling back to a single stream");
                job.discard_parts();
                job.discard_destination();
                sink.on_progress(0, "Parallel download failed, retrying...");

                let fallback = TransferJob::single(&job.url, &job.destination, job.total_size);
                let bytes = self
                    .execute(&SingleStreamStrategy::new(), &fallback, sink)
                    .map_err(|e| match e {
                        ManagerError::RangeUnsupported { url, status } => ManagerError::network(
                            &url,
                            format!("unexpected status {} on fallback", status),
                        ),
                        other => other,
                    })?;

                Ok(TransferOutcome {
                    path: job.destination.clone(),
                    bytes,
                    strategy: Strategy::Single,
                    fell_back: true,
                })
            }
        }
    }

    fn execute(
        &self,
        strategy: &dyn TransferStrategy,
        job: &TransferJob,
        sink: &dyn ProgressSink,
    ) -> ManagerResult<u64> {
        let bytes = strategy.execute(job, &self.fetcher, sink)?;

        if let Some(expected) = job.total_size {
            if bytes != expected {
                return Err(ManagerError::network(
                    &job.url,
                    format!("expected {} bytes, received {}", expected, bytes),
                ));
            }
        }

        Ok(bytes)
    }
}
