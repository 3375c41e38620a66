//! Directory scanning for task files.

use super::naming::filename_id;
use crate::error::{Result, StmError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A file in the tasks directory whose name carries a task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskEntry {
    /// Id parsed from the filename.
    pub id: u64,
    pub path: PathBuf,
}

/// List every task file in `dir`, in no particular order.
///
/// A missing directory has no entries. Files that do not match the task
/// filename pattern (temp files, notes, subdirectories) are ignored.
pub(crate) fn scan_entries(dir: &Path) -> Result<Vec<TaskEntry>> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StmError::io("read tasks directory", dir, e)),
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| StmError::io("read tasks directory", dir, e))?;

        let Some(id) = entry.file_name().to_str().and_then(filename_id) else {
            continue;
        };
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }

        entries.push(TaskEntry {
            id,
            path: entry.path(),
        });
    }
    Ok(entries)
}

/// Whether `path` currently appears in a listing of its directory.
pub(crate) fn is_listed(path: &Path) -> bool {
    let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
        return false;
    };
    fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(|entry| entry.ok())
            .any(|entry| entry.file_name() == name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let entries = scan_entries(&temp.path().join("nope")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_scan_filters_non_task_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("1-first.md"), "x").unwrap();
        fs::write(dir.join("12-twelfth.md"), "x").unwrap();
        fs::write(dir.join("README.md"), "x").unwrap();
        fs::write(dir.join(".3-pending.md.1.0.tmp"), "x").unwrap();
        fs::write(dir.join("4-notes.txt"), "x").unwrap();
        fs::create_dir(dir.join("5-folder.md")).unwrap();

        let mut ids: Vec<u64> = scan_entries(dir).unwrap().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 12]);
    }

    #[test]
    fn test_is_listed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("1-a.md");
        assert!(!is_listed(&path));
        fs::write(&path, "x").unwrap();
        assert!(is_listed(&path));
    }
}
