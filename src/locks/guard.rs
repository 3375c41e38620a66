//! RAII lock guard implementation.

use super::descriptor::{LockDescriptor, MarkerRead};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// A lock held by this process.
///
/// Shared between the [`LockGuard`] and the registry (weakly), so either side
/// can release it. Releasing is idempotent.
#[derive(Debug)]
pub(crate) struct HeldLock {
    path: PathBuf,
    descriptor: LockDescriptor,
    released: AtomicBool,
}

impl HeldLock {
    pub(crate) fn new(path: PathBuf, descriptor: LockDescriptor) -> Self {
        Self {
            path,
            descriptor,
            released: AtomicBool::new(false),
        }
    }

    /// Remove the marker if it still carries this acquisition's descriptor.
    ///
    /// A marker that was reclaimed and re-acquired by someone else is left
    /// alone. Never fails; problems are logged.
    pub(crate) fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        match MarkerRead::from_path(&self.path) {
            MarkerRead::Missing => {
                debug!(path = %self.path.display(), "lock marker already gone");
            }
            MarkerRead::Valid { descriptor, .. } if descriptor.same_holder(&self.descriptor) => {
                match fs::remove_file(&self.path) {
                    Ok(()) => debug!(path = %self.path.display(), "released lock"),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => warn!(
                        path = %self.path.display(),
                        error = %e,
                        "failed to release lock"
                    ),
                }
            }
            MarkerRead::Valid { descriptor, .. } => {
                warn!(
                    path = %self.path.display(),
                    holder_pid = descriptor.pid,
                    "lock was reclaimed by another holder; not releasing"
                );
            }
            MarkerRead::Corrupt { reason, .. } => {
                warn!(
                    path = %self.path.display(),
                    %reason,
                    "lock marker no longer ours; not releasing"
                );
            }
        }
    }

    pub(crate) fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

/// RAII guard for the store lock.
///
/// When dropped, the marker file is deleted if it is still ours.
#[derive(Debug)]
pub struct LockGuard {
    held: Arc<HeldLock>,
}

impl LockGuard {
    pub(super) fn new(held: Arc<HeldLock>) -> Self {
        Self { held }
    }

    /// The descriptor written for this acquisition.
    pub fn descriptor(&self) -> &LockDescriptor {
        &self.held.descriptor
    }

    /// Release the lock before the guard goes out of scope.
    pub fn release(self) {
        self.held.release();
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.held.release();
    }
}
