//! File I/O for task files.

use super::{Task, codec};
use crate::error::{Result, StmError};
use crate::fs::atomic_write;
use serde_yaml::Value;
use std::path::Path;

impl Task {
    /// Load a task file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| StmError::io("read task file", path, e))?;
        Self::parse(&content)
    }

    /// Atomically replace the file at `path` with this task.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_text()?;
        atomic_write(path, content.as_bytes())
    }
}

/// Read only the frontmatter `id` of the file at `path`.
///
/// Returns `None` when the file cannot be read, has no metadata block, or its
/// `id` is missing or not a non-negative integer. Used by id allocation,
/// which must tolerate damaged files.
pub(crate) fn read_id(path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;
    let (mapping, _) = codec::decode(&content).ok()?;
    match mapping.get("id")? {
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
