//! Progress aggregation for transfers.
//!
//! Parallel fetchers share one [`ProgressCounters`]: a single atomic byte
//! counter plus the highest percentage already forwarded to the sink. Each
//! fetcher reports after its own increment, so updates from different parts
//! may reach the sink out of order, but each percentage is forwarded at most
//! once.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::manager::traits::ProgressSink;

/// Integer percentage of `done` over `total`, floored and capped at 100.
pub fn percent_of(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (done as u128 * 100) / total as u128;
    pct.min(100) as u8
}

/// Status line for a running transfer.
pub fn downloading_message(done: u64, total: Option<u64>) -> String {
    match total {
        Some(total) if total > 0 => format!("Downloading... {}%", percent_of(done, total)),
        _ => format!("Downloading... {} KB", done / 1024),
    }
}

/// Shared progress counters for one transfer.
#[derive(Debug)]
pub struct ProgressCounters {
    downloaded: AtomicU64,
    reported: AtomicU8,
    total: u64,
}

impl ProgressCounters {
    /// Create counters for a transfer of `total` bytes.
    pub fn new(total: u64) -> Self {
        Self {
            downloaded: AtomicU64::new(0),
            reported: AtomicU8::new(0),
            total,
        }
    }

    /// Add `bytes` to the counter.
    ///
    /// Returns the new percentage if it is higher than anything reported
    /// before, `None` if the update would be redundant.
    pub fn record(&self, bytes: u64) -> Option<u8> {
        let downloaded = self.downloaded.fetch_add(bytes, Ordering::SeqCst) + bytes;
        let pct = percent_of(downloaded, self.total);
        let previous = self.reported.fetch_max(pct, Ordering::SeqCst);
        (pct > previous).then_some(pct)
    }

    /// Add `bytes` and forward any new percentage to `sink`.
    pub fn record_and_report(&self, bytes: u64, sink: &dyn ProgressSink) {
        if let Some(pct) = self.record(bytes) {
            sink.on_progress(pct, &format!("Downloading... {}%", pct));
        }
    }
}
