//! Update and delete under the store lock.

use super::naming::task_filename;
use super::{TaskStore, check_identity};
use crate::error::{Result, StmError};
use crate::task::{Task, TaskPatch, now};
use std::fs;
use std::io;
use tracing::{debug, warn};

impl TaskStore {
    /// Apply `patch` to task `id` and persist it.
    ///
    /// The new content is written to the (possibly renamed) target path with
    /// an atomic replace; the old file is removed only after that succeeds.
    pub fn update(&self, id: u64, patch: TaskPatch) -> Result<Task> {
        patch.validate(&self.limits)?;

        let _guard = self.lock.acquire()?;
        let old_path = self.locate(id)?;
        let mut task = Task::load(&old_path)?;
        check_identity(id, &old_path, &task)?;

        task.apply_patch(patch, now());
        let new_path = self.tasks_dir.join(task_filename(id, &task.meta.title));
        task.save(&new_path)?;

        if new_path != old_path {
            fs::remove_file(&old_path)
                .map_err(|e| StmError::io("remove renamed task file", &old_path, e))?;
            debug!(
                id,
                from = %old_path.display(),
                to = %new_path.display(),
                "renamed task file"
            );
        }
        Ok(task)
    }

    /// Remove task `id`.
    pub fn delete(&self, id: u64) -> Result<()> {
        let _guard = self.lock.acquire()?;
        let path = self.locate(id)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(id, path = %path.display(), "deleted task");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(id, path = %path.display(), "task file vanished before delete");
                Err(StmError::NotFound(id))
            }
            Err(e) => Err(StmError::io("delete task file", &path, e)),
        }
    }
}
