//! Atomic file replacement.
//!
//! All atomic writes follow this pattern:
//! 1. Write content to a uniquely named temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. `rename()` it over the target
//!
//! `rename()` is atomic when source and destination are on the same
//! filesystem, which holds because the temp file is a sibling of the target.
//! On crash, a temporary file may remain (named `.{filename}.{pid}.{n}.tmp`).

use super::{sync_parent, temp_path_for};
use crate::error::{Result, StmError};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Atomically write bytes to a file, replacing any previous content.
///
/// # Returns
///
/// * `Ok(())` - On successful atomic write
/// * `Err(StmError::StorageIo)` - On write or rename failure; the previous
///   content of `path` is left untouched
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| StmError::io("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path).map_err(|e| StmError::io("write", path, e))?;

    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StmError::io("atomically replace", path, e)
    })?;

    sync_parent(path);
    Ok(())
}

/// Write content to a fresh file and sync it to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| StmError::io("create temporary file", path, e))?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        StmError::io("write temporary file", path, e)
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        StmError::io("sync temporary file", path, e)
    })?;

    Ok(())
}
