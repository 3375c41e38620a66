//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};

/// Current config schema version written by `stm init`.
pub const CONFIG_SCHEMA: u32 = 1;

/// Configuration for an stm workspace.
///
/// This struct represents the contents of `.stm/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config format version.
    pub schema: u32,

    // =========================================================================
    // Storage settings
    // =========================================================================
    /// Directory holding task files, relative to the `.stm` directory.
    pub tasks_dir: String,

    /// Maximum title length in characters.
    pub max_title_length: usize,

    /// Maximum size of a task body in bytes.
    pub max_task_size_bytes: usize,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Total time `acquire` keeps retrying before giving up.
    pub lock_timeout_ms: u64,

    /// Sleep between acquisition attempts.
    pub lock_retry_interval_ms: u64,

    /// Age after which a held lock is presumed abandoned.
    pub lock_stale_ms: u64,

    /// Minimum age before a lock whose holder process is gone is reclaimed.
    pub lock_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: CONFIG_SCHEMA,
            tasks_dir: default_tasks_dir(),
            max_title_length: 200,
            max_task_size_bytes: 1024 * 1024,
            lock_timeout_ms: 5_000,
            lock_retry_interval_ms: 100,
            lock_stale_ms: 30_000,
            lock_grace_ms: 1_000,
        }
    }
}

pub(crate) fn default_tasks_dir() -> String {
    "tasks".to_string()
}
