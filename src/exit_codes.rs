//! Exit code constants for the stm CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, workspace not initialized)
//! - 2: Validation failure (bad title, oversized body, malformed task file)
//! - 3: Task not found
//! - 4: Lock acquisition timed out
//! - 5: Integrity failure (id mismatch, allocation exhausted)
//! - 6: Storage failure (permissions, disk full, ...)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid workspace state.
pub const USER_ERROR: i32 = 1;

/// Validation failure: input or stored metadata rejected.
pub const VALIDATION_FAILURE: i32 = 2;

/// The requested task does not exist.
pub const NOT_FOUND: i32 = 3;

/// Lock acquisition failure: the store lock could not be acquired in time.
pub const LOCK_FAILURE: i32 = 4;

/// Integrity failure: on-disk state is inconsistent beyond recovery.
pub const INTEGRITY_FAILURE: i32 = 5;

/// Filesystem failure.
pub const STORAGE_FAILURE: i32 = 6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            VALIDATION_FAILURE,
            NOT_FOUND,
            LOCK_FAILURE,
            INTEGRITY_FAILURE,
            STORAGE_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
