//! Integration tests for installs and saves round-trips.
//!
//! These tests drive the public job API the way a presentation layer would:
//! spawn a worker, drain the event channel on the test thread, and answer
//! overwrite requests as they arrive.
//!
//! Run with: `cargo test --test install_integration`

mod common;

use std::fs;
use std::path::{Path, PathBuf};

use mcsm_launcher::catalog::Season;
use mcsm_launcher::events::{self, Event, EventReceiver};
use mcsm_launcher::jobs::{spawn_backup, spawn_install, spawn_restore, InstallRequest};
use mcsm_launcher::manager::{DownloadConfig, ErrorKind, JobResult, ManagerConfig};
use mcsm_launcher::saves::{collect_entries, RestoreOutcome};
use tempfile::TempDir;

use common::{file_names, payload, zip_bytes, ServerOptions, TestServer};

// ============================================================================
// Helper Functions
// ============================================================================

/// Drain events until the worker hangs up, answering overwrite requests
/// with `allow`. Returns the terminal event and the conflicts seen.
fn drive(mut rx: EventReceiver, allow: bool) -> (Event, Vec<PathBuf>) {
    let mut terminal = None;
    let mut conflicts = Vec::new();

    while let Some(event) = rx.blocking_recv() {
        match event {
            Event::Progress { .. } => {}
            Event::OverwriteRequested(request) => {
                conflicts.extend(request.conflicts().paths().iter().cloned());
                request.respond(allow);
            }
            other => terminal = Some(other),
        }
    }

    (terminal.expect("job ended without a terminal event"), conflicts)
}

fn manager_config(staging: &Path) -> ManagerConfig {
    ManagerConfig::new(staging.to_path_buf()).with_download(DownloadConfig::new().with_timeout_secs(20))
}

fn relative_files(root: &Path) -> Vec<String> {
    collect_entries(root)
        .unwrap()
        .iter()
        .map(|e| e.archive_name())
        .collect()
}

// ============================================================================
// Install
// ============================================================================

#[test]
fn test_install_season_two_normalizes_layout() {
    let filler = payload(512 * 1024);
    let archive = zip_bytes(&[
        (
            "S2/Minecraft.Story.Mode.Season.Two/Minecraft Story Mode Season Two/Minecraft2.exe",
            b"MZ",
        ),
        (
            "S2/Minecraft.Story.Mode.Season.Two/Minecraft Story Mode Season Two/Archives/data.ttarch2",
            &filler,
        ),
    ]);
    let server = TestServer::start(archive, ServerOptions::default());
    let temp = TempDir::new().unwrap();
    let staging = temp.path().join("staging");
    let target = temp.path().join("games");

    let request = InstallRequest::for_season(Season::Two, &target).with_url(server.url());
    let (tx, rx) = events::channel();
    let handle = spawn_install(request, manager_config(&staging), tx).unwrap();
    let (terminal, _) = drive(rx, false);
    handle.join().unwrap();

    match terminal {
        Event::Completed(JobResult::Installed(result)) => {
            assert!(result.normalized);
            assert_eq!(result.executable, Some(target.join("S2/Minecraft2.exe")));
        }
        other => panic!("unexpected terminal event: {other:?}"),
    }
    assert!(target.join("S2/Archives/data.ttarch2").is_file());
    assert!(!target.join("S2/Minecraft.Story.Mode.Season.Two").exists());
    assert!(file_names(&staging).is_empty());
}

#[test]
fn test_install_reports_missing_executable_as_success() {
    let server = TestServer::start(zip_bytes(&[("readme.txt", b"hello")]), ServerOptions::default());
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("S1");

    let request = InstallRequest::for_season(Season::One, &target).with_url(server.url());
    let (tx, rx) = events::channel();
    spawn_install(request, manager_config(&temp.path().join("staging")), tx).unwrap();
    let (terminal, _) = drive(rx, false);

    match terminal {
        Event::Completed(JobResult::Installed(result)) => assert_eq!(result.executable, None),
        other => panic!("unexpected terminal event: {other:?}"),
    }
}

#[test]
fn test_install_of_non_zip_fails_with_bad_archive() {
    let server = TestServer::start(b"<html>gone</html>".to_vec(), ServerOptions::default());
    let temp = TempDir::new().unwrap();
    let staging = temp.path().join("staging");

    let request = InstallRequest::for_season(Season::One, temp.path().join("S1")).with_url(server.url());
    let (tx, rx) = events::channel();
    spawn_install(request, manager_config(&staging), tx).unwrap();
    let (terminal, _) = drive(rx, false);

    assert!(matches!(
        terminal,
        Event::Failed {
            kind: ErrorKind::BadArchive,
            ..
        }
    ));
    assert!(file_names(&staging).is_empty());
}

// ============================================================================
// Saves
// ============================================================================

fn seed_saves(dir: &Path) {
    fs::create_dir_all(dir.join("slot1")).unwrap();
    fs::write(dir.join("prefs.prop"), "prefs").unwrap();
    fs::write(dir.join("slot1/ep1.save"), "episode one").unwrap();
    fs::write(dir.join("slot1/ep2.save"), "episode two").unwrap();
}

fn run_backup(source: &Path, archive: &Path) -> Event {
    let (tx, rx) = events::channel();
    spawn_backup(source.to_path_buf(), archive.to_path_buf(), tx).unwrap();
    drive(rx, false).0
}

#[test]
fn test_backup_then_restore_reproduces_files() {
    let temp = TempDir::new().unwrap();
    let saves = temp.path().join("saves");
    seed_saves(&saves);
    let archive = temp.path().join("Season_1_saves_backup.zip");

    assert!(matches!(
        run_backup(&saves, &archive),
        Event::Completed(JobResult::BackedUp(_))
    ));

    let restored = temp.path().join("restored");
    let (tx, rx) = events::channel();
    spawn_restore(archive, restored.clone(), tx.prompt(), tx).unwrap();
    let (terminal, conflicts) = drive(rx, false);

    assert!(conflicts.is_empty());
    assert!(matches!(
        terminal,
        Event::Completed(JobResult::Restored(RestoreOutcome::Imported { copied: 3, .. }))
    ));
    assert_eq!(relative_files(&restored), relative_files(&saves));
    assert_eq!(
        fs::read_to_string(restored.join("slot1/ep2.save")).unwrap(),
        "episode two"
    );
}

#[test]
fn test_restore_conflict_denied_leaves_destination_untouched() {
    let temp = TempDir::new().unwrap();
    let saves = temp.path().join("saves");
    seed_saves(&saves);
    let archive = temp.path().join("backup.zip");
    run_backup(&saves, &archive);

    let live = temp.path().join("live");
    fs::create_dir_all(live.join("slot1")).unwrap();
    fs::write(live.join("slot1/ep1.save"), "current progress").unwrap();

    let (tx, rx) = events::channel();
    spawn_restore(archive, live.clone(), tx.prompt(), tx).unwrap();
    let (terminal, conflicts) = drive(rx, false);

    assert_eq!(conflicts, vec![PathBuf::from("slot1/ep1.save")]);
    assert!(matches!(
        terminal,
        Event::Completed(JobResult::Restored(RestoreOutcome::Cancelled { .. }))
    ));
    assert_eq!(relative_files(&live), vec!["slot1/ep1.save"]);
    assert_eq!(
        fs::read_to_string(live.join("slot1/ep1.save")).unwrap(),
        "current progress"
    );
}

#[test]
fn test_restore_conflict_allowed_overwrites_and_adds() {
    let temp = TempDir::new().unwrap();
    let saves = temp.path().join("saves");
    seed_saves(&saves);
    let archive = temp.path().join("backup.zip");
    run_backup(&saves, &archive);

    let live = temp.path().join("live");
    fs::create_dir_all(live.join("slot1")).unwrap();
    fs::write(live.join("slot1/ep1.save"), "current progress").unwrap();

    let (tx, rx) = events::channel();
    spawn_restore(archive, live.clone(), tx.prompt(), tx).unwrap();
    let (terminal, conflicts) = drive(rx, true);

    assert_eq!(conflicts.len(), 1);
    assert!(matches!(
        terminal,
        Event::Completed(JobResult::Restored(RestoreOutcome::Imported { copied: 3, .. }))
    ));
    assert_eq!(
        fs::read_to_string(live.join("slot1/ep1.save")).unwrap(),
        "episode one"
    );
    assert!(live.join("prefs.prop").exists());
}

#[test]
fn test_backup_of_empty_directory_fails_without_archive() {
    let temp = TempDir::new().unwrap();
    let saves = temp.path().join("saves");
    fs::create_dir_all(&saves).unwrap();
    let archive = temp.path().join("backup.zip");

    let terminal = run_backup(&saves, &archive);

    assert!(matches!(
        terminal,
        Event::Failed {
            kind: ErrorKind::NoFilesFound,
            ..
        }
    ));
    assert!(!archive.exists());
}
