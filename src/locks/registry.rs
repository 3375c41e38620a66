//! Process-lifetime registry of held locks.
//!
//! The binary creates one registry at startup and passes it to everything that
//! acquires locks. Guards stay the primary release path; the registry only
//! exists so a signal or a panic can still clean up markers the process holds.

use super::descriptor::LockDescriptor;
use super::guard::{HeldLock, LockGuard};
use crate::error::{Result, StmError};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::debug;

/// Tracks locks acquired by this process through weak references.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    held: Arc<Mutex<Vec<Weak<HeldLock>>>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly acquired lock and hand out its guard.
    pub(super) fn register(&self, path: PathBuf, descriptor: LockDescriptor) -> LockGuard {
        let held = Arc::new(HeldLock::new(path, descriptor));

        let mut list = self.entries();
        list.retain(|weak| weak.upgrade().is_some_and(|h| !h.is_released()));
        list.push(Arc::downgrade(&held));

        LockGuard::new(held)
    }

    /// Number of locks currently held through this registry.
    pub fn active_count(&self) -> usize {
        self.entries()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|h| !h.is_released())
            .count()
    }

    /// Release every lock still held through this registry.
    ///
    /// Returns how many locks were released. Safe to call repeatedly and
    /// concurrently with guards being dropped.
    pub fn release_all(&self) -> usize {
        let live: Vec<Arc<HeldLock>> = self
            .entries()
            .drain(..)
            .filter_map(|weak| weak.upgrade())
            .filter(|h| !h.is_released())
            .collect();

        for held in &live {
            held.release();
        }
        if !live.is_empty() {
            debug!(count = live.len(), "released locks held at shutdown");
        }
        live.len()
    }

    /// Install SIGINT/SIGTERM and panic hooks that release all held locks.
    ///
    /// Signals terminate the process with exit code 130 after cleanup. The
    /// panic hook chains to the previously installed hook. Call once, from
    /// the entry point.
    pub fn install_shutdown_hooks(&self) -> Result<()> {
        let on_signal = self.clone();
        ctrlc::set_handler(move || {
            on_signal.release_all();
            std::process::exit(130);
        })
        .map_err(|e| StmError::User(format!("failed to install signal handler: {}", e)))?;

        let on_panic = self.clone();
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            on_panic.release_all();
            previous(info);
        }));

        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Weak<HeldLock>>> {
        // A poisoned list is still a valid list of weak pointers.
        self.held.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}
