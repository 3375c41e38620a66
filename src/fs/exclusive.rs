//! Exclusive creation of fully written files.
//!
//! `create_new` alone makes the target visible before its content is written,
//! so a concurrent reader can see an empty file. Here the content is written to
//! a temp file first and then hard-linked to the target: `link()` fails with
//! `AlreadyExists` when the target exists, and the target never exists without
//! its complete content.

use super::{sync_parent, temp_path_for};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Create `path` with `content`, failing if it already exists.
///
/// Errors are returned as raw `io::Error` so callers can branch on
/// `ErrorKind::AlreadyExists` (somebody else won) and `ErrorKind::NotFound`
/// (the directory is missing).
///
/// Filesystems without hard link support fall back to `create_new` followed by
/// a write, so there the target is briefly visible empty.
pub fn create_exclusive(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path)?;

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);

    match linked {
        Ok(()) => {
            sync_parent(path);
            Ok(())
        }
        Err(e)
            if matches!(
                e.kind(),
                io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
            ) =>
        {
            create_new_and_write(path, content)
        }
        Err(e) => Err(e),
    }
}

fn create_new_and_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;

    let written = file.write_all(content).and_then(|_| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(e);
    }

    sync_parent(path);
    Ok(())
}
