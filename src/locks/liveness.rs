//! Process liveness probe.

/// Check whether a process with the given PID exists on this host.
///
/// Uses `kill(pid, 0)`, which performs the permission and existence checks of
/// sending a signal without sending one. `ESRCH` means the process is gone;
/// `EPERM` means it exists but belongs to someone else, which counts as alive.
pub(crate) fn is_process_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    let Ok(pid) = i32::try_from(pid) else {
        return false;
    };

    #[cfg(unix)]
    {
        // SAFETY: signal 0 only checks for process existence; no signal is delivered.
        let result = unsafe { libc::kill(pid, 0) };
        if result == 0 {
            return true;
        }
        std::io::Error::last_os_error().raw_os_error() != Some(libc::ESRCH)
    }

    #[cfg(not(unix))]
    {
        // No cheap probe; never reclaim on liveness grounds.
        let _ = pid;
        true
    }
}
