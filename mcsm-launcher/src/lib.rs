//! MCSM Launcher - download, install and save management for Minecraft: Story Mode
//!
//! This library holds the background machinery of the launcher: parallel
//! range downloads with a single-stream fallback, zip installation with
//! layout normalization, and saves backup/restore with overwrite
//! confirmation. Presentation layers talk to it through the
//! [`manager::ProgressSink`] and [`manager::OverwritePrompt`] traits, or
//! through the channel types in [`events`].

pub mod catalog;
pub mod config;
pub mod events;
pub mod jobs;
pub mod logging;
pub mod manager;
pub mod saves;
