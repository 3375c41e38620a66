//! Task creation: id allocation plus exclusive publish, retried on collision.

use super::TaskStore;
use super::allocate::next_id;
use super::naming::task_filename;
use super::scan::{is_listed, scan_entries};
use crate::error::{Result, StmError};
use crate::fs::create_exclusive;
use crate::task::{NewTask, Task, now};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempts before creation gives up with an integrity error.
const MAX_CREATE_ATTEMPTS: u32 = 10;

/// Directory polls after publishing before the new file is assumed visible.
const VISIBILITY_POLLS: u32 = 20;
const VISIBILITY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why an attempt lost a race it can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Collision {
    /// A file already carries the allocated id.
    Id(u64),
    /// The exact target filename already exists.
    Filename(u64),
}

#[derive(Debug)]
pub(crate) enum AttemptError {
    Retryable(Collision),
    Fatal(StmError),
}

impl From<StmError> for AttemptError {
    fn from(err: StmError) -> Self {
        AttemptError::Fatal(err)
    }
}

impl TaskStore {
    /// Create a task with a freshly allocated id.
    ///
    /// Input is validated before the lock is taken. The lock is held for the
    /// whole allocate-and-publish sequence and released on every path.
    ///
    /// # Errors
    ///
    /// * `StmError::Validation` - Title, body or extra fields are invalid
    /// * `StmError::LockTimeout` - Another writer held the lock too long
    /// * `StmError::Integrity` - Every attempt collided with an existing file
    /// * `StmError::StorageIo` - The task file could not be written
    pub fn create(&self, input: NewTask) -> Result<Task> {
        self.limits.validate_new(&input)?;

        let _guard = self.lock.acquire()?;
        self.ensure_tasks_dir()?;

        let mut floor = 0;
        let mut id_collisions = 0;
        let mut filename_collisions = 0;

        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            match self.try_create(&input, floor) {
                Ok(task) => return Ok(task),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retryable(collision)) => {
                    debug!(attempt, ?collision, "task create collided; retrying");
                    let id = match collision {
                        Collision::Id(id) => {
                            id_collisions += 1;
                            id
                        }
                        Collision::Filename(id) => {
                            filename_collisions += 1;
                            id
                        }
                    };
                    floor = id.saturating_add(1).max(floor);
                }
            }
        }

        Err(StmError::Integrity(format!(
            "could not create task after {} attempts ({} id collisions, {} filename collisions)",
            MAX_CREATE_ATTEMPTS, id_collisions, filename_collisions
        )))
    }

    /// One allocate-and-publish attempt; `floor` is the lowest id to consider.
    fn try_create(
        &self,
        input: &NewTask,
        floor: u64,
    ) -> std::result::Result<Task, AttemptError> {
        let entries = scan_entries(&self.tasks_dir)?;
        let id = next_id(&entries)?.max(floor);

        let task = Task::new(id, input.clone(), now());
        let path = self.tasks_dir.join(task_filename(id, &task.meta.title));

        if scan_entries(&self.tasks_dir)?.iter().any(|e| e.id == id) {
            return Err(AttemptError::Retryable(Collision::Id(id)));
        }

        let content = task.to_text()?;
        match create_exclusive(&path, content.as_bytes()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(AttemptError::Retryable(Collision::Filename(id)));
            }
            Err(e) => return Err(StmError::io("create task file", &path, e).into()),
        }

        wait_until_listed(&path);
        debug!(id, path = %path.display(), "created task");
        Ok(task)
    }
}

/// Poll the directory until `path` shows up in a listing.
///
/// The file is already durable when this runs, so running out of polls is
/// only logged.
fn wait_until_listed(path: &Path) {
    for _ in 0..VISIBILITY_POLLS {
        if is_listed(path) {
            return;
        }
        std::thread::sleep(VISIBILITY_POLL_INTERVAL);
    }
    warn!(path = %path.display(), "new task file not yet visible in directory listing");
}
