//! Reassembly of parallel part files into the destination file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::plan::RangePart;
use crate::manager::error::{ManagerError, ManagerResult};

/// Concatenate `parts` into `output` in ascending index order.
///
/// Each part file is removed right after it has been appended. The parts are
/// sorted by index first, so callers may pass them in any order. Returns the
/// size of the assembled file.
pub fn reassemble(parts: &[RangePart], output: &Path) -> ManagerResult<u64> {
    let mut ordered: Vec<&RangePart> = parts.iter().collect();
    ordered.sort_by_key(|p| p.index);

    for part in &ordered {
        if !part.path.exists() {
            return Err(ManagerError::io(
                &part.path,
                io::Error::new(io::ErrorKind::NotFound, "part file not found"),
            ));
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| ManagerError::io(parent, e))?;
    }
    let output_file = File::create(output).map_err(|e| ManagerError::io(output, e))?;
    let mut writer = BufWriter::new(output_file);
    let mut total_size = 0u64;

    for part in ordered {
        let file = File::open(&part.path).map_err(|e| ManagerError::io(&part.path, e))?;
        let mut reader = BufReader::new(file);

        total_size += io::copy(&mut reader, &mut writer).map_err(|e| ManagerError::io(output, e))?;

        drop(reader);
        fs::remove_file(&part.path).map_err(|e| ManagerError::io(&part.path, e))?;
        debug!(part = part.index, total_size, "Appended part");
    }

    writer.flush().map_err(|e| ManagerError::io(output, e))?;

    Ok(total_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::download::plan::part_path;
    use tempfile::TempDir;

    fn part(dest: &Path, index: usize, start: u64, end: u64) -> RangePart {
        RangePart {
            index,
            start,
            end,
            path: part_path(dest, index),
        }
    }

    #[test]
    fn test_reassemble_in_index_order() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("game.zip");

        let parts = vec![
            part(&output, 2, 6, 10),
            part(&output, 0, 0, 4),
            part(&output, 1, 5, 5),
        ];
        fs::write(&parts[0].path, b"World").unwrap();
        fs::write(&parts[1].path, b"Hello").unwrap();
        fs::write(&parts[2].path, b" ").unwrap();

        let size = reassemble(&parts, &output).unwrap();

        assert_eq!(size, 11);
        assert_eq!(fs::read_to_string(&output).unwrap(), "Hello World");
        for p in &parts {
            assert!(!p.path.exists(), "part {} should be removed", p.index);
        }
    }

    #[test]
    fn test_reassemble_missing_part() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("game.zip");
        let parts = vec![part(&output, 0, 0, 4)];

        let result = reassemble(&parts, &output);

        assert!(result.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_reassemble_single_part() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.bin");
        let parts = vec![part(&output, 0, 0, 11)];
        fs::write(&parts[0].path, b"test content").unwrap();

        let size = reassemble(&parts, &output).unwrap();

        assert_eq!(size, 12);
        assert_eq!(fs::read_to_string(&output).unwrap(), "test content");
    }
}
