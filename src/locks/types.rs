//! Lock settings and status reporting structures.

use super::descriptor::LockDescriptor;
use std::time::Duration;

/// Timing parameters for lock acquisition and reclamation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockSettings {
    /// Overall acquisition budget.
    pub timeout: Duration,

    /// Sleep between attempts while the lock is validly held.
    pub retry_interval: Duration,

    /// Age after which a marker is presumed abandoned.
    pub stale_after: Duration,

    /// Minimum marker age before a dead holder's marker is reclaimed.
    pub dead_holder_grace: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retry_interval: Duration::from_millis(100),
            stale_after: Duration::from_secs(30),
            dead_holder_grace: Duration::from_secs(1),
        }
    }
}

/// Information about the current holder of a lock.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The descriptor read from the marker.
    pub descriptor: LockDescriptor,

    /// How long the lock has been held.
    pub age: Duration,

    /// Whether the marker is older than the staleness threshold.
    pub is_stale: bool,

    /// Result of the liveness probe; `None` when the holder runs on another host.
    pub holder_alive: Option<bool>,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pid {} (command: {}, age: {}{}{})",
            self.descriptor.pid,
            self.descriptor.command,
            format_age(self.age),
            if self.holder_alive == Some(false) {
                ", process gone"
            } else {
                ""
            },
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

/// Observed state of a lock marker.
#[derive(Debug, Clone)]
pub enum LockState {
    /// No marker exists.
    Unlocked,
    /// A marker exists but cannot be read or parsed.
    Corrupt { reason: String },
    /// A well-formed marker exists.
    Held(LockInfo),
}

/// Format a duration as a short human-readable age.
pub(crate) fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    let (minutes, hours, days) = (secs / 60, secs / 3600, secs / 86_400);

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs % 60)
    } else {
        format!("{}ms", age.as_millis())
    }
}
