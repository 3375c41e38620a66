//! Error types for stm.
//!
//! Uses thiserror for derive macros. Every variant maps to a distinct exit
//! code so scripts can tell a stuck lock apart from a missing task.

use crate::exit_codes;
use std::path::Path;
use thiserror::Error;

/// Main error type for stm operations.
#[derive(Error, Debug)]
pub enum StmError {
    /// Invalid input or invalid workspace state reported by the CLI layer.
    #[error("{0}")]
    User(String),

    /// Input or stored metadata failed validation.
    ///
    /// Raised before any lock is taken when it concerns caller input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The id does not resolve to a task file.
    #[error("task {0} not found")]
    NotFound(u64),

    /// The lock could not be acquired within the retry budget.
    #[error("Lock acquisition timed out: {0}")]
    LockTimeout(String),

    /// Filename and frontmatter disagree, or allocation could not make progress.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Underlying filesystem failure.
    #[error("{context}: {source}")]
    StorageIo {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl StmError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            StmError::User(_) => exit_codes::USER_ERROR,
            StmError::Validation(_) => exit_codes::VALIDATION_FAILURE,
            StmError::NotFound(_) => exit_codes::NOT_FOUND,
            StmError::LockTimeout(_) => exit_codes::LOCK_FAILURE,
            StmError::Integrity(_) => exit_codes::INTEGRITY_FAILURE,
            StmError::StorageIo { .. } => exit_codes::STORAGE_FAILURE,
        }
    }

    /// Wrap an I/O error with the action and path it concerns.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        StmError::StorageIo {
            context: format!("failed to {} '{}'", action, path.display()),
            source,
        }
    }
}

/// Result type alias for stm operations.
pub type Result<T> = std::result::Result<T, StmError>;
