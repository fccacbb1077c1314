//! Transfer strategies.
//!
//! This module implements the Strategy pattern for single-stream vs parallel
//! range downloading of one resource.

use std::thread;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::assemble::reassemble;
use super::plan::{Strategy, TransferJob};
use super::progress::{downloading_message, percent_of, ProgressCounters};
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::{ProgressSink, RangeFetcher};

/// Strategy for moving a remote resource into `job.destination`.
pub trait TransferStrategy: Send + Sync {
    /// Which plan this strategy carries out.
    fn kind(&self) -> Strategy;

    /// Execute the transfer.
    ///
    /// # Returns
    ///
    /// The number of bytes in the destination file. On error no part files
    /// are left behind; the destination may exist and is the caller's to
    /// remove.
    fn execute(
        &self,
        job: &TransferJob,
        fetcher: &dyn RangeFetcher,
        sink: &dyn ProgressSink,
    ) -> ManagerResult<u64>;
}

/// Single-stream strategy.
///
/// Streams the whole body into the destination. Used for small resources,
/// servers without range support, and as the fallback for failed parallel
/// transfers.
#[derive(Debug, Default)]
pub struct SingleStreamStrategy;

impl SingleStreamStrategy {
    /// Create a new single-stream strategy.
    pub fn new() -> Self {
        Self
    }
}

impl TransferStrategy for SingleStreamStrategy {
    fn kind(&self) -> Strategy {
        Strategy::Single
    }

    fn execute(
        &self,
        job: &TransferJob,
        fetcher: &dyn RangeFetcher,
        sink: &dyn ProgressSink,
    ) -> ManagerResult<u64> {
        let mut last_percent = None;
        let mut last_kib = None;

        let mut on_bytes = |done: u64, content_length: Option<u64>| match job
            .total_size
            .or(content_length)
            .filter(|&t| t > 0)
        {
            Some(total) => {
                let pct = percent_of(done, total);
                if last_percent != Some(pct) {
                    last_percent = Some(pct);
                    sink.on_progress(pct, &downloading_message(done, Some(total)));
                }
            }
            None => {
                let kib = done / 1024;
                if last_kib != Some(kib) {
                    last_kib = Some(kib);
                    sink.on_progress(0, &downloading_message(done, None));
                }
            }
        };

        fetcher.fetch_whole(&job.url, &job.destination, &mut on_bytes)
    }
}

/// Parallel range strategy.
///
/// Runs one fetcher thread per planned part. All threads share one
/// [`ProgressCounters`]; each writes only its own part file. Parts are
/// concatenated in index order once every thread has finished.
#[derive(Debug, Default)]
pub struct ParallelRangeStrategy;

impl ParallelRangeStrategy {
    /// Create a new parallel strategy.
    pub fn new() -> Self {
        Self
    }
}

impl TransferStrategy for ParallelRangeStrategy {
    fn kind(&self) -> Strategy {
        Strategy::Parallel
    }

    fn execute(
        &self,
        job: &TransferJob,
        fetcher: &dyn RangeFetcher,
        sink: &dyn ProgressSink,
    ) -> ManagerResult<u64> {
        let total = match job.total_size {
            Some(total) if !job.parts.is_empty() => total,
            _ => {
                return Err(ManagerError::PartialDownload {
                    failed_parts: Vec::new(),
                })
            }
        };

        let counters = ProgressCounters::new(total);
        let received = Mutex::new(vec![0u64; job.parts.len()]);
        let failed_parts = Mutex::new(Vec::new());

        thread::scope(|scope| {
            for (slot, part) in job.parts.iter().enumerate() {
                let counters = &counters;
                let received = &received;
                let failed_parts = &failed_parts;

                scope.spawn(move || {
                    let on_bytes = |n: u64| counters.record_and_report(n, sink);

                    match fetcher.fetch_range(&job.url, part, &on_bytes) {
                        Ok(bytes) => received.lock()[slot] = bytes,
                        Err(e) => {
                            warn!(url = %job.url, part = part.index, error = %e, "Part failed");
                            failed_parts.lock().push(part.index);
                        }
                    }
                });
            }
        });

        let received = received.into_inner();
        let mut failed = failed_parts.into_inner();
        for (part, &bytes) in job.parts.iter().zip(&received) {
            if bytes != part.size() && !failed.contains(&part.index) {
                warn!(url = %job.url, part = part.index, bytes, expected = part.size(), "Part ended early");
                failed.push(part.index);
            }
        }
        if !failed.is_empty() {
            failed.sort_unstable();
            job.discard_parts();
            return Err(ManagerError::PartialDownload {
                failed_parts: failed,
            });
        }

        let written: u64 = received.iter().sum();
        if written != total {
            job.discard_parts();
            return Err(ManagerError::network(
                &job.url,
                format!("received {} of {} bytes across all parts", written, total),
            ));
        }

        debug!(url = %job.url, parts = job.parts.len(), "All parts fetched, reassembling");
        reassemble(&job.parts, &job.destination).inspect_err(|_| job.discard_parts())
    }
}
