//! File I/O utilities with atomic writes
//!
//! A vault record is rewritten wholesale on every persist; the temp-file +
//! rename dance guarantees the record on disk is either the old one or the
//! new one, never a torn write.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CofferError, CofferResult};

/// Read JSON from a file, returning `None` if the file doesn't exist
pub fn read_json_opt<T, P>(path: P) -> CofferResult<Option<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .map_err(|e| CofferError::Storage(format!("failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map(Some)
        .map_err(|e| CofferError::Storage(format!("failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> CofferResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CofferError::Storage(format!(
                "failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory so the rename stays on one filesystem.
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| CofferError::Storage(format!("failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| CofferError::Storage(format!("failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| CofferError::Storage(format!("failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CofferError::Storage(format!("failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path)
        .map_err(|e| CofferError::Storage(format!("failed to finalize write: {}", e)))?;

    Ok(())
}

/// Delete a file if it exists
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> CofferResult<()> {
    let path = path.as_ref();
    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| CofferError::Storage(format!("failed to remove {}: {}", path.display(), e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        let back: Option<Vec<i32>> = read_json_opt(&path).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));

        // No stray temp file left behind.
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_file_reads_none() {
        let dir = TempDir::new().unwrap();
        let back: Option<Vec<i32>> = read_json_opt(dir.path().join("absent.json")).unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        write_json_atomic(&path, &1).unwrap();

        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
        // Removing again is a no-op.
        remove_if_exists(&path).unwrap();
    }
}
