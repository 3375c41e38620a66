//! Lock acquisition, inspection, and clearing operations.

use super::descriptor::{LockDescriptor, MarkerRead};
use super::guard::LockGuard;
use super::liveness::is_process_alive;
use super::registry::LockRegistry;
use super::types::{LockInfo, LockSettings, LockState, format_age};
use crate::error::{Result, StmError};
use crate::fs::create_exclusive;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

/// How many times acquisition recreates a vanished lock directory before
/// reporting the failure.
const MAX_DIR_RECREATIONS: u32 = 3;

/// A cross-process mutual-exclusion lock backed by a marker file.
#[derive(Debug, Clone)]
pub struct MutexLock {
    path: PathBuf,
    settings: LockSettings,
    registry: LockRegistry,
}

/// Decision taken about an existing marker.
#[derive(Debug)]
enum Verdict {
    /// The marker must be waited out.
    Held(LockDescriptor),
    /// The marker was judged abandoned and removed.
    Reclaimed,
    /// The marker was judged abandoned but could not be removed.
    Stuck,
    /// The marker disappeared before it could be assessed.
    Gone,
}

impl MutexLock {
    /// Create a lock handle for the marker at `path`.
    ///
    /// Guards acquired through this handle are tracked by `registry`.
    pub fn new(path: impl Into<PathBuf>, settings: LockSettings, registry: LockRegistry) -> Self {
        Self {
            path: path.into(),
            settings,
            registry,
        }
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the lock, waiting up to the configured timeout.
    ///
    /// # Returns
    ///
    /// * `Ok(LockGuard)` - The lock is held until the guard is dropped
    /// * `Err(StmError::LockTimeout)` - The budget ran out; the message names
    ///   the holder as last seen
    /// * `Err(StmError::StorageIo)` - The marker could not be written
    pub fn acquire(&self) -> Result<LockGuard> {
        let deadline = Instant::now() + self.settings.timeout;
        let mut dir_recreations = 0;
        let mut attempts: u64 = 0;
        let mut last_holder: Option<LockDescriptor> = None;

        loop {
            attempts += 1;
            // Stamped per attempt so the published marker's age starts at zero
            // however long this call has waited.
            let descriptor = LockDescriptor::current();
            let payload = descriptor.to_json()?;
            match create_exclusive(&self.path, payload.as_bytes()) {
                Ok(()) => {
                    debug!(path = %self.path.display(), attempts, "acquired lock");
                    return Ok(self.registry.register(self.path.clone(), descriptor));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e)
                    if e.kind() == io::ErrorKind::NotFound
                        && dir_recreations < MAX_DIR_RECREATIONS =>
                {
                    dir_recreations += 1;
                    self.create_lock_dir()?;
                    continue;
                }
                Err(e) => return Err(StmError::io("create lock file", &self.path, e)),
            }

            match self.assess(MarkerRead::from_path(&self.path)) {
                Verdict::Gone | Verdict::Reclaimed => {}
                Verdict::Stuck => self.pause(deadline),
                Verdict::Held(holder) => {
                    last_holder = Some(holder);
                    self.pause(deadline);
                }
            }

            if Instant::now() >= deadline {
                break;
            }
        }

        Err(StmError::LockTimeout(
            self.describe_timeout(last_holder.as_ref(), attempts),
        ))
    }

    /// Report the current state of the marker without touching it.
    pub fn inspect(&self) -> LockState {
        match MarkerRead::from_path(&self.path) {
            MarkerRead::Missing => LockState::Unlocked,
            MarkerRead::Corrupt { reason, .. } => LockState::Corrupt { reason },
            MarkerRead::Valid { descriptor, .. } => LockState::Held(self.info(descriptor)),
        }
    }

    /// Remove the marker regardless of who holds it.
    ///
    /// Returns the state observed before clearing. The caller is responsible
    /// for deciding that clearing is appropriate (e.g. `--force`).
    pub fn force_clear(&self) -> Result<LockState> {
        let state = self.inspect();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(state),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LockState::Unlocked),
            Err(e) => Err(StmError::io("clear lock", &self.path, e)),
        }
    }

    /// Build holder information for a descriptor read from the marker.
    fn info(&self, descriptor: LockDescriptor) -> LockInfo {
        let age = descriptor.age_at(Utc::now().timestamp_millis());
        let holder_alive = descriptor
            .is_local()
            .then(|| is_process_alive(descriptor.pid));
        LockInfo {
            is_stale: age > self.settings.stale_after,
            age,
            holder_alive,
            descriptor,
        }
    }

    /// Decide what to do about an existing marker, removing it when abandoned.
    fn assess(&self, marker: MarkerRead) -> Verdict {
        let reason = match &marker {
            MarkerRead::Missing => return Verdict::Gone,
            MarkerRead::Corrupt { reason, .. } => {
                // A marker written without a hard link is briefly empty; give
                // its writer the same grace as a dead holder.
                let Some(age) = self.marker_file_age() else {
                    return Verdict::Gone;
                };
                if age <= self.settings.dead_holder_grace {
                    return Verdict::Stuck;
                }
                format!("marker is corrupt ({})", reason)
            }
            MarkerRead::Valid { descriptor, .. } => {
                let info = self.info(descriptor.clone());
                if info.is_stale {
                    format!(
                        "marker held by pid {} is stale (age {}, threshold {})",
                        descriptor.pid,
                        format_age(info.age),
                        format_age(self.settings.stale_after)
                    )
                } else if info.holder_alive == Some(false)
                    && info.age > self.settings.dead_holder_grace
                {
                    format!("holder pid {} is no longer running", descriptor.pid)
                } else {
                    return Verdict::Held(info.descriptor);
                }
            }
        };

        warn!(path = %self.path.display(), %reason, "reclaiming lock");
        if self.remove_if_unchanged(&marker) {
            Verdict::Reclaimed
        } else {
            Verdict::Stuck
        }
    }

    /// Time since the marker file was last modified, or `None` if it is gone.
    ///
    /// An unknown or future mtime counts as zero.
    fn marker_file_age(&self) -> Option<Duration> {
        let modified = match fs::metadata(&self.path) {
            Ok(meta) => meta.modified().ok(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(_) => None,
        };
        Some(
            modified
                .and_then(|modified| SystemTime::now().duration_since(modified).ok())
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Sleep one retry interval, never past `deadline`.
    fn pause(&self, deadline: Instant) {
        let now = Instant::now();
        if now < deadline {
            std::thread::sleep(self.settings.retry_interval.min(deadline - now));
        }
    }

    /// Remove the marker only if it still has the content that was judged.
    ///
    /// Narrows the window in which two waiters both judge the same marker
    /// abandoned and the slower one deletes the faster one's fresh marker.
    /// Returns `false` only when removal failed; a changed or vanished marker
    /// counts as progress.
    fn remove_if_unchanged(&self, judged: &MarkerRead) -> bool {
        if let Some(judged_raw) = judged.raw() {
            match fs::read_to_string(&self.path) {
                Ok(current) if current == judged_raw => {}
                Ok(_) => {
                    debug!(path = %self.path.display(), "marker changed before reclaim; skipping");
                    return true;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
                Err(_) => return false,
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to remove lock marker");
                false
            }
        }
    }

    fn create_lock_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StmError::io("create lock directory", parent, e))?;
        }
        Ok(())
    }

    fn describe_timeout(&self, holder: Option<&LockDescriptor>, attempts: u64) -> String {
        let waited = format_age(self.settings.timeout);
        match holder {
            Some(holder) => format!(
                "lock '{}' is held by pid {} ({}) for {}; gave up after {} and {} attempts.\n\
                 If that process is stuck, run `stm lock clear --force`.",
                self.path.display(),
                holder.pid,
                holder.command,
                format_age(holder.age()),
                waited,
                attempts
            ),
            None => format!(
                "lock '{}' could not be acquired within {} ({} attempts)",
                self.path.display(),
                waited,
                attempts
            ),
        }
    }
}
