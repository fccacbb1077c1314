//! Saves directory backup.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::entries::{collect_entries, ArchiveEntry};
use crate::manager::download::percent_of;
use crate::manager::{ManagerError, ManagerResult, ProgressSink};

/// Result of a backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResult {
    /// The written archive.
    pub archive_path: PathBuf,
    /// Number of files stored.
    pub files: usize,
}

/// Suggested archive file name for a backup of `label`, e.g.
/// `Season_1_saves_backup.zip` for "Season 1".
pub fn default_backup_name(label: &str) -> String {
    format!("{}_saves_backup.zip", label.replace(' ', "_"))
}

/// Archive every file under `source_dir` into `archive_path`.
///
/// Fails with `NoFilesFound` (without creating the archive) when there is
/// nothing to back up. A failure while writing removes the partial archive.
pub fn backup(
    source_dir: &Path,
    archive_path: &Path,
    sink: &dyn ProgressSink,
) -> ManagerResult<BackupResult> {
    let entries = collect_entries(source_dir)?;
    if entries.is_empty() {
        return Err(ManagerError::NoFilesFound {
            path: source_dir.to_path_buf(),
        });
    }

    info!(source = %source_dir.display(), archive = %archive_path.display(), files = entries.len(), "Backing up saves");
    sink.on_progress(0, "Backing up saves...");

    if let Err(e) = write_archive(&entries, archive_path, sink) {
        if let Err(remove_err) = fs::remove_file(archive_path) {
            if remove_err.kind() != io::ErrorKind::NotFound {
                warn!(path = %archive_path.display(), error = %remove_err, "Failed to remove partial backup");
            }
        }
        return Err(e);
    }

    sink.on_progress(100, &format!("Backup complete: {}", archive_path.display()));
    Ok(BackupResult {
        archive_path: archive_path.to_path_buf(),
        files: entries.len(),
    })
}

fn write_archive(
    entries: &[ArchiveEntry],
    archive_path: &Path,
    sink: &dyn ProgressSink,
) -> ManagerResult<()> {
    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ManagerError::io(parent, e))?;
    }

    let file = File::create(archive_path).map_err(|e| ManagerError::io(archive_path, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let total = entries.len() as u64;

    for (i, entry) in entries.iter().enumerate() {
        let name = entry.archive_name();
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| zip_write_error(archive_path, e))?;

        let mut input =
            BufReader::new(File::open(&entry.source).map_err(|e| ManagerError::io(&entry.source, e))?);
        io::copy(&mut input, &mut writer).map_err(|e| ManagerError::io(&entry.source, e))?;
        debug!(entry = %name, "Archived file");

        let pct = percent_of(i as u64 + 1, total);
        sink.on_progress(pct, &format!("Backing up... {}%", pct));
    }

    let mut out = writer.finish().map_err(|e| zip_write_error(archive_path, e))?;
    out.flush().map_err(|e| ManagerError::io(archive_path, e))?;
    Ok(())
}

fn zip_write_error(archive_path: &Path, err: zip::result::ZipError) -> ManagerError {
    match err {
        zip::result::ZipError::Io(e) => ManagerError::io(archive_path, e),
        other => ManagerError::io(archive_path, io::Error::other(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{ErrorKind, NullSink};
    use parking_lot::Mutex;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(u8, String)>>);

    impl ProgressSink for Recorder {
        fn on_progress(&self, percent: u8, message: &str) {
            self.0.lock().push((percent, message.to_string()));
        }
    }

    #[test]
    fn test_default_backup_name() {
        assert_eq!(default_backup_name("Season 1"), "Season_1_saves_backup.zip");
    }

    #[test]
    fn test_backup_writes_relative_entries() {
        let temp = TempDir::new().unwrap();
        let saves = temp.path().join("saves");
        fs::create_dir_all(saves.join("slot1")).unwrap();
        fs::write(saves.join("prefs.prop"), "prefs").unwrap();
        fs::write(saves.join("slot1/ep1.save"), "episode one").unwrap();

        let archive = temp.path().join("backups/s1.zip");
        let sink = Recorder::default();
        let result = backup(&saves, &archive, &sink).unwrap();

        assert_eq!(result.files, 2);
        assert_eq!(result.archive_path, archive);

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["prefs.prop", "slot1/ep1.save"]);
        let mut contents = String::new();
        io::Read::read_to_string(&mut zip.by_name("slot1/ep1.save").unwrap(), &mut contents).unwrap();
        assert_eq!(contents, "episode one");

        let reports = sink.0.lock();
        assert!(reports.iter().any(|(p, m)| *p == 50 && m == "Backing up... 50%"));
        assert!(reports.iter().any(|(p, m)| *p == 100 && m == "Backing up... 100%"));
    }

    #[test]
    fn test_backup_empty_directory() {
        let temp = TempDir::new().unwrap();
        let saves = temp.path().join("saves");
        fs::create_dir_all(saves.join("empty_slot")).unwrap();
        let archive = temp.path().join("s1.zip");

        let err = backup(&saves, &archive, &NullSink).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoFilesFound);
        assert!(!archive.exists());
    }

    #[test]
    fn test_backup_missing_directory() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("s1.zip");

        let err = backup(&temp.path().join("missing"), &archive, &NullSink).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoFilesFound);
        assert!(!archive.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_backup_failure_removes_partial_archive() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let saves = temp.path().join("saves");
        fs::create_dir_all(&saves).unwrap();
        fs::write(saves.join("a.save"), "a").unwrap();
        let locked = saves.join("b.save");
        fs::write(&locked, "b").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let archive = temp.path().join("s1.zip");
        let result = backup(&saves, &archive, &NullSink);

        // Privileged users can still read the locked file.
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::IoError);
            assert!(!archive.exists());
        }
    }
}
