//! HTTP transfer of game packages.
//!
//! This module provides functionality for downloading one remote archive,
//! including:
//! - Probing, range fetches and whole-body fetches (`http`)
//! - Strategy selection and byte-range partitioning (`plan`)
//! - Shared atomic progress aggregation (`progress`)
//! - Single-stream and parallel range strategies (`strategy`)
//! - Ordered reassembly of part files (`assemble`)
//! - High-level orchestration with one fallback (`orchestrator`)
//!
//! # Architecture
//!
//! ```text
//! TransferCoordinator (orchestrator)
//!         │
//!         ├── TransferJob (plan: strategy + RangeParts)
//!         │
//!         ├── TransferStrategy (trait)
//!         │       ├── SingleStreamStrategy
//!         │       └── ParallelRangeStrategy ── reassemble()
//!         │
//!         ├── RangeFetcher (trait) ── HttpDownloader
//!         │
//!         └── ProgressCounters (shared atomic counter)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mcsm_launcher::manager::{DownloadConfig, NullSink};
//! use mcsm_launcher::manager::download::TransferCoordinator;
//!
//! let coordinator = TransferCoordinator::new(DownloadConfig::default())?;
//! let outcome = coordinator.fetch(
//!     "https://example.com/game.zip",
//!     Path::new("/tmp/game.zip"),
//!     &NullSink,
//! )?;
//! println!("{} bytes via {}", outcome.bytes, outcome.strategy);
//! ```

mod assemble;
mod http;
mod orchestrator;
mod plan;
mod progress;
mod strategy;

pub use assemble::reassemble;
pub use http::HttpDownloader;
pub use orchestrator::{TransferCoordinator, TransferOutcome, DOWNLOAD_COMPLETE_MESSAGE};
pub use plan::{part_path, plan_ranges, RangePart, ResourceInfo, Strategy, TransferJob};
pub use progress::{percent_of, ProgressCounters};
pub use strategy::{ParallelRangeStrategy, SingleStreamStrategy, TransferStrategy};
