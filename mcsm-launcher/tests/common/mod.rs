//! Shared fixtures for the integration tests: an HTTP file server with
//! range support toggles and fault injection, zip builders, and a recording
//! progress sink.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE},
        HeaderMap, Method, Response, StatusCode,
    },
    routing::get,
    Router,
};
use mcsm_launcher::manager::ProgressSink;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

// ============================================================================
// HTTP server
// ============================================================================

/// How the test server treats range requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Advertise and honour ranges.
    Supported,
    /// Advertise nothing, always send the full body.
    Unsupported,
    /// Advertise ranges but answer every request with the full body.
    Ignored,
}

/// Server behaviour.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub ranges: RangeMode,
    /// Answer range requests starting at this offset with a 500.
    pub fail_range_at: Option<u64>,
    /// Answer plain (non-range) GETs with a 500.
    pub fail_whole: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            ranges: RangeMode::Supported,
            fail_range_at: None,
            fail_whole: false,
        }
    }
}

struct ServerState {
    body: Vec<u8>,
    options: ServerOptions,
    range_requests: AtomicUsize,
    whole_requests: AtomicUsize,
}

/// A file server on its own runtime thread, so blocking clients can talk to
/// it from the test thread.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    pub fn start(body: Vec<u8>, options: ServerOptions) -> Self {
        let state = Arc::new(ServerState {
            body,
            options,
            range_requests: AtomicUsize::new(0),
            whole_requests: AtomicUsize::new(0),
        });

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let addr = std_listener.local_addr().unwrap();

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let router = Router::new()
            .route("/game.zip", get(serve_file))
            .with_state(Arc::clone(&state));

        let thread = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = TcpListener::from_std(std_listener).unwrap();
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            addr,
            state,
            shutdown: Some(shutdown),
            thread: Some(thread),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/game.zip", self.addr)
    }

    pub fn missing_url(&self) -> String {
        format!("http://{}/missing.zip", self.addr)
    }

    pub fn range_requests(&self) -> usize {
        self.state.range_requests.load(Ordering::SeqCst)
    }

    pub fn whole_requests(&self) -> usize {
        self.state.whole_requests.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn parse_range(headers: &HeaderMap, len: u64) -> Option<(u64, u64)> {
    let value = headers.get(RANGE)?.to_str().ok()?;
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    let start: u64 = start.parse().ok()?;
    let end: u64 = end.parse().ok()?;
    (start <= end && end < len).then_some((start, end))
}

async fn serve_file(
    State(state): State<Arc<ServerState>>,
    method: Method,
    headers: HeaderMap,
) -> Response<Body> {
    let len = state.body.len() as u64;
    let options = &state.options;

    if method == Method::HEAD {
        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_LENGTH, len);
        if options.ranges != RangeMode::Unsupported {
            builder = builder.header(ACCEPT_RANGES, "bytes");
        }
        return builder.body(Body::empty()).unwrap();
    }

    let range = match options.ranges {
        RangeMode::Supported => parse_range(&headers, len),
        RangeMode::Unsupported | RangeMode::Ignored => None,
    };

    let mut builder = Response::builder().header(CONTENT_TYPE, "application/zip");
    if options.ranges != RangeMode::Unsupported {
        builder = builder.header(ACCEPT_RANGES, "bytes");
    }

    match range {
        Some((start, end)) => {
            state.range_requests.fetch_add(1, Ordering::SeqCst);
            if options.fail_range_at == Some(start) {
                return error_response();
            }
            let slice = state.body[start as usize..=end as usize].to_vec();
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, len))
                .header(CONTENT_LENGTH, slice.len())
                .body(Body::from(slice))
                .unwrap()
        }
        None => {
            if headers.contains_key(RANGE) {
                state.range_requests.fetch_add(1, Ordering::SeqCst);
            } else {
                state.whole_requests.fetch_add(1, Ordering::SeqCst);
                if options.fail_whole {
                    return error_response();
                }
            }
            builder
                .status(StatusCode::OK)
                .header(CONTENT_LENGTH, len)
                .body(Body::from(state.body.clone()))
                .unwrap()
        }
    }
}

fn error_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(Body::from("injected failure"))
        .unwrap()
}

// ============================================================================
// Fixtures
// ============================================================================

/// Deterministic pseudo-random bytes.
pub fn payload(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Build an in-memory zip from `(name, contents)` pairs.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Write a zip file from `(name, contents)` pairs.
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    std::fs::write(path, zip_bytes(entries)).unwrap();
}

/// Names of the files directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Progress sink
// ============================================================================

/// Records every progress report.
#[derive(Default)]
pub struct Recorder {
    reports: Mutex<Vec<(u8, String)>>,
}

impl Recorder {
    pub fn reports(&self) -> Vec<(u8, String)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.reports().into_iter().map(|(p, _)| p).collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.reports().last().map(|(_, m)| m.clone())
    }
}

impl ProgressSink for Recorder {
    fn on_progress(&self, percent: u8, message: &str) {
        self.reports.lock().unwrap().push((percent, message.to_string()));
    }
}
