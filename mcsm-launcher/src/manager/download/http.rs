//! HTTP-based chunk fetcher.
//!
//! This module provides the transport for the transfer coordinator:
//! - Metadata probing via HEAD (`Content-Length`, `Accept-Ranges`)
//! - Byte-range fetches into part files
//! - Whole-body fetches for the single-stream strategy

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, RANGE};
use reqwest::StatusCode;
use tracing::debug;

use super::plan::{RangePart, ResourceInfo};
use crate::manager::config::DownloadConfig;
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::RangeFetcher;

/// Read size for streaming response bodies (16KB).
const BUFFER_SIZE: usize = 16 * 1024;

/// HTTP implementation of [`RangeFetcher`].
///
/// The underlying client is reference counted, so one downloader can be
/// shared by every fetcher thread of a parallel transfer.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    pub(crate) timeout: Duration,
    pub(crate) probe_timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader from download settings.
    pub fn new(config: &DownloadConfig) -> ManagerResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.probe_timeout)
            .user_agent(concat!("mcsm-launcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ManagerError::network("<client>", e))?;

        Ok(Self {
            client,
            timeout: config.timeout,
            probe_timeout: config.probe_timeout,
        })
    }

    /// Send a GET, mapping transport failures to `Network`.
    fn get(&self, url: &str, range: Option<&RangePart>) -> ManagerResult<Response> {
        let mut request = self.client.get(url);
        if let Some(part) = range {
            request = request.header(RANGE, part.header_value());
        }

        request.send().map_err(|e| {
            if e.is_timeout() {
                ManagerError::network(
                    url,
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            } else {
                ManagerError::network(url, e)
            }
        })
    }
}

impl RangeFetcher for HttpDownloader {
    fn probe(&self, url: &str) -> ResourceInfo {
        let response = match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(url, status = %r.status(), "HEAD probe rejected");
                return ResourceInfo::default();
            }
            Err(e) => {
                debug!(url, error = %e, "HEAD probe failed");
                return ResourceInfo::default();
            }
        };

        let headers = response.headers();
        let total_size = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let accepts_ranges = headers
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("bytes"))
            .unwrap_or(false);

        debug!(url, ?total_size, accepts_ranges, "Probed resource");
        ResourceInfo {
            total_size,
            accepts_ranges,
        }
    }

    fn fetch_range(
        &self,
        url: &str,
        part: &RangePart,
        on_bytes: &(dyn Fn(u64) + Sync),
    ) -> ManagerResult<u64> {
        let response = self.get(url, Some(part))?;

        let status = response.status();
        if status != StatusCode::PARTIAL_CONTENT {
            if status.is_success() {
                return Err(ManagerError::RangeUnsupported {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            return Err(ManagerError::network(
                url,
                format!("range request failed with status {}", status),
            ));
        }

        let written = stream_to_file(url, response, &part.path, |_, n| on_bytes(n))?;

        if written != part.size() {
            return Err(ManagerError::network(
                url,
                format!(
                    "part {} ended early: expected {} bytes, got {}",
                    part.index,
                    part.size(),
                    written
                ),
            ));
        }

        debug!(url, part = part.index, bytes = written, "Fetched range");
        Ok(written)
    }

    fn fetch_whole(
        &self,
        url: &str,
        dest: &Path,
        on_bytes: &mut dyn FnMut(u64, Option<u64>),
    ) -> ManagerResult<u64> {
        let response = self.get(url, None)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::network(
                url,
                format!("GET request failed with status {}", status),
            ));
        }

        let content_length = response.content_length();
        let written = stream_to_file(url, response, dest, |total, _| {
            on_bytes(total, content_length)
        })?;

        if let Some(expected) = content_length {
            if written < expected {
                return Err(ManagerError::network(
                    url,
                    format!("body ended early: expected {} bytes, got {}", expected, written),
                ));
            }
        }

        debug!(url, bytes = written, "Fetched whole resource");
        Ok(written)
    }
}

/// Stream a response body into `dest`, creating or truncating it.
///
/// `progress` receives the running total and the size of the latest read.
fn stream_to_file(
    url: &str,
    mut response: Response,
    dest: &Path,
    mut progress: impl FnMut(u64, u64),
) -> ManagerResult<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::io(parent, e))?;
    }
    let file = File::create(dest).map_err(|e| ManagerError::io(dest, e))?;

    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut downloaded = 0u64;

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| ManagerError::network(url, format!("read error: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| ManagerError::io(dest, e))?;

        downloaded += bytes_read as u64;
        progress(downloaded, bytes_read as u64);
    }

    writer.flush().map_err(|e| ManagerError::io(dest, e))?;

    Ok(downloaded)
}
