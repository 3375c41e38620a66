//! Locking subsystem for stm.
//!
//! A single marker file (`.stm/lock`) serializes every mutation of the task
//! directory across processes. Whoever manages to create the marker holds the
//! lock; the marker is published with exclusive-create semantics so exactly one
//! contender can succeed.
//!
//! # Marker Content
//!
//! The marker holds a JSON [`LockDescriptor`]:
//! - `pid`: process ID of the holder
//! - `command`: the holder's command line
//! - `timestamp`: acquisition time in epoch milliseconds
//! - `host`: hostname of the holder
//!
//! The content is advisory. It is only consulted to decide whether a marker
//! left behind by a crashed process can be reclaimed, and to name the holder
//! when acquisition times out.
//!
//! # Reclaiming Abandoned Markers
//!
//! A waiting contender removes the marker when it is unreadable, older than
//! the staleness threshold, or owned by a process on this host that no longer
//! exists (once the marker is older than a short grace window).
//!
//! # RAII Guards and Shutdown
//!
//! [`MutexLock::acquire`] returns a [`LockGuard`] that releases on drop. Each
//! guard is tracked by the [`LockRegistry`] it was acquired through, so signal
//! and panic hooks installed by the binary can release everything the process
//! still holds.

mod descriptor;
mod guard;
mod liveness;
mod mutex;
mod registry;
mod types;


pub use descriptor::LockDescriptor;
pub use guard::LockGuard;
pub use mutex::MutexLock;
pub use registry::LockRegistry;
pub use types::{LockInfo, LockSettings, LockState};
