//! Filesystem utilities for stm.
//!
//! Two write primitives keep the task directory consistent for readers that
//! never take the lock:
//!
//! - [`atomic_write`] replaces a file through a temp file and `rename()`.
//! - [`create_exclusive`] publishes a new file through a temp file and a hard
//!   link, which fails if the target already exists.
//!
//! Either way a reader observes the old content, the new content, or no file,
//! never a half-written one.

pub mod atomic;
mod exclusive;

pub use atomic::atomic_write;
pub use exclusive::create_exclusive;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a temporary file path in the same directory as the target.
///
/// The name embeds the pid and a per-process counter so concurrent writers
/// (threads or processes) never share a temp file. Leading dot keeps it out of
/// task listings.
pub(crate) fn temp_path_for(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid file path"))?;

    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_name = format!(".{}.{}.{}.tmp", filename, std::process::id(), seq);
    Ok(parent.join(temp_name))
}

/// Best-effort fsync of the directory holding `path`, so the new directory
/// entry survives a crash.
pub(crate) fn sync_parent(path: &Path) {
    #[cfg(unix)]
    if let Some(parent) = path.parent()
        && let Ok(dir) = std::fs::File::open(parent)
    {
        let _ = dir.sync_all();
    }
    #[cfg(not(unix))]
    let _ = path;
}
