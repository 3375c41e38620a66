//! Next-id allocation.
//!
//! Must run under the store lock. The filename is authoritative: a file
//! whose metadata cannot be read still reserves the id in its name.

use super::scan::TaskEntry;
use crate::error::{Result, StmError};
use crate::task::read_id;
use tracing::{debug, warn};

/// Compute the next free id from the current directory entries.
pub(crate) fn next_id(entries: &[TaskEntry]) -> Result<u64> {
    let Some(highest) = entries.iter().max_by_key(|e| e.id) else {
        return Ok(1);
    };

    let max = match read_id(&highest.path) {
        Some(meta_id) if meta_id == highest.id => highest.id,
        Some(meta_id) => {
            warn!(
                path = %highest.path.display(),
                filename_id = highest.id,
                metadata_id = meta_id,
                "task filename and metadata disagree; scanning all task files"
            );
            full_scan_max(entries)
        }
        None => {
            warn!(
                path = %highest.path.display(),
                "cannot read id from highest task file; trusting its filename"
            );
            highest.id
        }
    };

    let next = max.checked_add(1).ok_or_else(|| {
        StmError::Integrity(format!("task id space exhausted (highest id is {})", max))
    })?;
    debug!(next, "allocated task id");
    Ok(next)
}

/// Highest id across every file, counting both filename and metadata ids.
fn full_scan_max(entries: &[TaskEntry]) -> u64 {
    entries
        .iter()
        .map(|entry| match read_id(&entry.path) {
            Some(meta_id) => meta_id.max(entry.id),
            None => {
                warn!(path = %entry.path.display(), "skipping unreadable task metadata");
                entry.id
            }
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_task(dir: &Path, filename: &str, meta_id: u64) -> TaskEntry {
        let path = dir.join(filename);
        fs::write(&path, format!("---\nid: {}\ntitle: t\n---\n", meta_id)).unwrap();
        TaskEntry {
            id: super::super::naming::filename_id(filename).unwrap(),
            path,
        }
    }

    #[test]
    fn test_empty_directory_starts_at_one() {
        assert_eq!(next_id(&[]).unwrap(), 1);
    }

    #[test]
    fn test_consistent_highest_file() {
        let temp = TempDir::new().unwrap();
        let entries = vec![
            write_task(temp.path(), "1-a.md", 1),
            write_task(temp.path(), "3-c.md", 3),
        ];
        assert_eq!(next_id(&entries).unwrap(), 4);
    }

    #[test]
    fn test_corrupt_highest_file_trusts_filename() {
        let temp = TempDir::new().unwrap();
        let old = write_task(temp.path(), "5-old.md", 5);
        let broken = temp.path().join("6-broken.md");
        fs::write(&broken, "---\nid: [oops\n---\n").unwrap();

        let entries = vec![
            old,
            TaskEntry {
                id: 6,
                path: broken,
            },
        ];
        assert_eq!(next_id(&entries).unwrap(), 7);
    }

    #[test]
    fn test_mismatch_triggers_full_scan() {
        let temp = TempDir::new().unwrap();
        // Metadata of a lower-named file claims a higher id.
        let entries = vec![
            write_task(temp.path(), "2-b.md", 20),
            write_task(temp.path(), "4-d.md", 9),
        ];
        assert_eq!(next_id(&entries).unwrap(), 21);
    }

    #[test]
    fn test_full_scan_counts_unreadable_filenames() {
        let temp = TempDir::new().unwrap();
        let broken = temp.path().join("8-broken.md");
        fs::write(&broken, "not frontmatter").unwrap();
        let entries = vec![
            write_task(temp.path(), "9-i.md", 3),
            TaskEntry {
                id: 8,
                path: broken,
            },
        ];
        assert_eq!(next_id(&entries).unwrap(), 10);
    }

    #[test]
    fn test_exhausted_id_space() {
        let temp = TempDir::new().unwrap();
        let name = format!("{}-last.md", u64::MAX);
        let entries = vec![write_task(temp.path(), &name, u64::MAX)];
        let err = next_id(&entries).unwrap_err();
        assert!(matches!(err, StmError::Integrity(_)));
    }
}
