//! Lock descriptor stored in the marker file.

use crate::error::{Result, StmError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Descriptor of the process holding a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockDescriptor {
    /// Process ID of the lock holder.
    pub pid: u32,

    /// Command line of the lock holder.
    pub command: String,

    /// Acquisition time in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// Hostname of the lock holder. Liveness is only probed on the same host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl LockDescriptor {
    /// Describe the current process, timestamped now.
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            command: current_command_line(),
            timestamp: Utc::now().timestamp_millis(),
            host: current_host(),
        }
    }

    /// Serialize the descriptor to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| StmError::User(format!("failed to serialize lock descriptor: {}", e)))
    }

    /// Age of the lock relative to `now_ms`.
    ///
    /// A timestamp in the future (clock skew between hosts) counts as age zero.
    pub fn age_at(&self, now_ms: i64) -> Duration {
        let millis = now_ms.saturating_sub(self.timestamp).max(0);
        Duration::from_millis(millis as u64)
    }

    /// Age of the lock relative to the current time.
    pub fn age(&self) -> Duration {
        self.age_at(Utc::now().timestamp_millis())
    }

    /// Whether this descriptor was written by a process on this host.
    ///
    /// Descriptors without a host are assumed local.
    pub fn is_local(&self) -> bool {
        match &self.host {
            Some(host) => current_host().is_none_or(|ours| &ours == host),
            None => true,
        }
    }

    /// Whether `other` describes the same acquisition as `self`.
    pub fn same_holder(&self, other: &LockDescriptor) -> bool {
        self.pid == other.pid && self.timestamp == other.timestamp
    }
}

/// What was found at a marker path.
#[derive(Debug, Clone)]
pub(crate) enum MarkerRead {
    /// No marker exists.
    Missing,
    /// The marker exists but could not be read or parsed.
    ///
    /// `raw` is `None` when the content itself could not be read.
    Corrupt { raw: Option<String>, reason: String },
    /// A well-formed marker.
    Valid {
        raw: String,
        descriptor: LockDescriptor,
    },
}

impl MarkerRead {
    /// Read and classify the marker at `path`.
    pub(crate) fn from_path(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return MarkerRead::Missing,
            Err(e) => {
                return MarkerRead::Corrupt {
                    raw: None,
                    reason: format!("unreadable: {}", e),
                };
            }
        };

        match serde_json::from_str::<LockDescriptor>(&raw) {
            Ok(descriptor) => MarkerRead::Valid { raw, descriptor },
            Err(e) => MarkerRead::Corrupt {
                raw: Some(raw),
                reason: format!("malformed descriptor: {}", e),
            },
        }
    }

    /// The raw marker content, when it could be read.
    pub(crate) fn raw(&self) -> Option<&str> {
        match self {
            MarkerRead::Missing => None,
            MarkerRead::Corrupt { raw, .. } => raw.as_deref(),
            MarkerRead::Valid { raw, .. } => Some(raw),
        }
    }
}

fn current_command_line() -> String {
    let command = std::env::args().collect::<Vec<_>>().join(" ");
    if command.is_empty() {
        "unknown".to_string()
    } else {
        command
    }
}

fn current_host() -> Option<String> {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().to_string())
}
