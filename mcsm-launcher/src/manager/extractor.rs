//! Zip archive extraction.
//!
//! This module handles:
//! - Extracting zip archives into a directory
//! - Listing archive contents
//! - Counting extracted files

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use super::error::{ManagerError, ManagerResult};
use super::traits::ArchiveExtractor;

/// Zip extractor built on the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new zip extractor.
    pub fn new() -> Self {
        Self
    }

    /// Open an archive, mapping format errors to `BadArchive`.
    fn open(&self, archive_path: &Path) -> ManagerResult<ZipArchive<BufReader<File>>> {
        let file = File::open(archive_path).map_err(|e| ManagerError::io(archive_path, e))?;
        ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(archive_path, e))
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> ManagerResult<usize> {
        let mut archive = self.open(archive_path)?;

        fs::create_dir_all(dest_dir).map_err(|e| ManagerError::io(dest_dir, e))?;

        let mut files = 0;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| zip_error(archive_path, e))?;

            let Some(relative) = entry.enclosed_name() else {
                warn!(name = entry.name(), "Skipping archive entry outside the target");
                continue;
            };
            let out_path = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| ManagerError::io(&out_path, e))?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| ManagerError::io(parent, e))?;
            }
            let mut out_file =
                File::create(&out_path).map_err(|e| ManagerError::io(&out_path, e))?;
            io::copy(&mut entry, &mut out_file).map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => ManagerError::BadArchive {
                    path: archive_path.to_path_buf(),
                    reason: e.to_string(),
                },
                _ => ManagerError::io(&out_path, e),
            })?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                // Keep the owner's read/write bit so we can always clean up.
                if let Err(e) =
                    fs::set_permissions(&out_path, fs::Permissions::from_mode(mode | 0o600))
                {
                    debug!(path = %out_path.display(), error = %e, "Could not apply archive permissions");
                }
            }

            files += 1;
        }

        debug!(archive = %archive_path.display(), dest = %dest_dir.display(), files, "Extracted archive");
        Ok(files)
    }
}

fn zip_error(archive_path: &Path, err: ZipError) -> ManagerError {
    match err {
        ZipError::Io(e) if e.kind() != io::ErrorKind::UnexpectedEof => {
            ManagerError::io(archive_path, e)
        }
        other => ManagerError::BadArchive {
            path: archive_path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs::File;
    use std::io::Write;
    use std::path::Path;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Write a zip at `path` with the given `(name, contents)` entries.
    pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::write_zip;
    use super::*;
    use crate::manager::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_zip_extractor_new() {
        let extractor = ZipExtractor::new();
        assert!(format!("{:?}", extractor).contains("ZipExtractor"));
    }

    #[test]
    fn test_extract_nested_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("game.zip");
        write_zip(
            &archive,
            &[("readme.txt", b"hi"), ("bin/Game.exe", b"MZ"), ("bin/data/a.pak", b"pak")],
        );

        let dest = temp.path().join("out");
        let count = ZipExtractor::new().extract(&archive, &dest).unwrap();

        assert_eq!(count, 3);
        assert_eq!(fs::read(dest.join("bin/Game.exe")).unwrap(), b"MZ");
        assert_eq!(fs::read(dest.join("bin/data/a.pak")).unwrap(), b"pak");
        assert!(archive.exists());
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("fake.zip");
        fs::write(&archive, b"this is not a zip file at all").unwrap();

        let err = ZipExtractor::new()
            .extract(&archive, &temp.path().join("out"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadArchive);
        assert!(archive.exists(), "archive must be left untouched");
    }

    #[test]
    fn test_extract_skips_escaping_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("../evil.txt", b"x"), ("safe.txt", b"y")]);

        let dest = temp.path().join("out");
        let count = ZipExtractor::new().extract(&archive, &dest).unwrap();

        assert_eq!(count, 1);
        assert!(dest.join("safe.txt").exists());
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_keeps_mode_with_owner_read_write() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("game.zip");
        let mut writer = ZipWriter::new(File::create(&archive).unwrap());
        writer
            .start_file("Game.sh", SimpleFileOptions::default().unix_permissions(0o500))
            .unwrap();
        writer.write_all(b"#!/bin/sh").unwrap();
        writer.finish().unwrap();

        let dest = temp.path().join("out");
        ZipExtractor::new().extract(&archive, &dest).unwrap();

        let mode = fs::metadata(dest.join("Game.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
