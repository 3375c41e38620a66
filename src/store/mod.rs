//! Task store over a directory of markdown files.
//!
//! Writers (`create`, `update`, `delete`) serialize through the workspace
//! lock. Readers (`get`, `list`) take no lock: every write either publishes a
//! complete file or atomically replaces one, so a reader sees the old or the
//! new content and never a partial file.

mod allocate;
mod create;
pub mod naming;
mod scan;
#[cfg(test)]
mod tests;
mod update;

use crate::config::Config;
use crate::context::Workspace;
use crate::error::{Result, StmError};
use crate::locks::{LockRegistry, LockSettings, MutexLock};
use crate::task::{Task, TaskLimits};
use scan::{TaskEntry, scan_entries};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Create/read/update/delete access to the tasks of one workspace.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks_dir: PathBuf,
    lock: MutexLock,
    limits: TaskLimits,
}

impl TaskStore {
    /// Build a store over `tasks_dir`, serialized by the marker at `lock_path`.
    pub fn new(
        tasks_dir: impl Into<PathBuf>,
        lock_path: impl Into<PathBuf>,
        settings: LockSettings,
        limits: TaskLimits,
        registry: LockRegistry,
    ) -> Self {
        Self {
            tasks_dir: tasks_dir.into(),
            lock: MutexLock::new(lock_path, settings, registry),
            limits,
        }
    }

    /// Build the store for a workspace using its configuration.
    pub fn open(workspace: &Workspace, config: &Config, registry: LockRegistry) -> Self {
        Self::new(
            workspace.tasks_dir(config),
            workspace.lock_path(),
            config.lock_settings(),
            TaskLimits::from(config),
            registry,
        )
    }

    pub fn tasks_dir(&self) -> &Path {
        &self.tasks_dir
    }

    /// The lock guarding writes to this store.
    pub fn lock(&self) -> &MutexLock {
        &self.lock
    }

    /// Read one task.
    ///
    /// # Errors
    ///
    /// * `StmError::NotFound` - No file carries this id
    /// * `StmError::Integrity` - The file's metadata claims a different id,
    ///   or several files carry this id
    pub fn get(&self, id: u64) -> Result<Task> {
        let path = self.locate(id)?;
        let task = Task::load(&path)?;
        check_identity(id, &path, &task)?;
        Ok(task)
    }

    /// Read every task, sorted by id.
    ///
    /// Files that cannot be parsed are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Task>> {
        let mut entries = scan_entries(&self.tasks_dir)?;
        entries.sort_by_key(|e| e.id);

        let mut tasks = Vec::with_capacity(entries.len());
        for entry in entries {
            match Task::load(&entry.path) {
                Ok(task) => {
                    if task.id() != entry.id {
                        warn!(
                            path = %entry.path.display(),
                            metadata_id = task.id(),
                            "task filename and metadata disagree"
                        );
                    }
                    tasks.push(task);
                }
                Err(e) => {
                    warn!(path = %entry.path.display(), error = %e, "skipping unreadable task file");
                }
            }
        }

        tasks.sort_by_key(Task::id);
        Ok(tasks)
    }

    /// Path of the single file whose name carries `id`.
    fn locate(&self, id: u64) -> Result<PathBuf> {
        let mut matches: Vec<TaskEntry> = scan_entries(&self.tasks_dir)?
            .into_iter()
            .filter(|e| e.id == id)
            .collect();

        match matches.len() {
            0 => Err(StmError::NotFound(id)),
            1 => Ok(matches.remove(0).path),
            n => Err(StmError::Integrity(format!(
                "{} files claim task id {} in '{}'",
                n,
                id,
                self.tasks_dir.display()
            ))),
        }
    }

    fn ensure_tasks_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.tasks_dir)
            .map_err(|e| StmError::io("create tasks directory", &self.tasks_dir, e))
    }
}

fn check_identity(id: u64, path: &Path, task: &Task) -> Result<()> {
    if task.id() != id {
        return Err(StmError::Integrity(format!(
            "'{}' is named for task {} but its metadata says id {}",
            path.display(),
            id,
            task.id()
        )));
    }
    Ok(())
}
