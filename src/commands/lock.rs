//! Implementation of the `stm lock status` and `stm lock clear` commands.

use super::open_store;
use crate::cli::LockClearArgs;
use crate::error::{Result, StmError};
use crate::locks::{LockInfo, LockRegistry, LockState};
use chrono::DateTime;
use std::fmt::Write as _;
use std::path::Path;

/// Execute the `stm lock status` command.
pub fn cmd_lock_status(registry: &LockRegistry) -> Result<()> {
    let store = open_store(registry)?;
    let lock = store.lock();
    print!("{}", render_status(lock.path(), &lock.inspect()));
    Ok(())
}

/// Execute the `stm lock clear` command.
pub fn cmd_lock_clear(args: LockClearArgs, registry: &LockRegistry) -> Result<()> {
    // Require --force flag
    if !args.force {
        return Err(StmError::User(
            "refusing to clear lock without --force flag.\n\n\
             Clearing the lock while its holder is still running can corrupt task ids.\n\
             Only clear it if you are certain the holder has crashed.\n\n\
             To clear the lock, run:\n  stm lock clear --force"
                .to_string(),
        ));
    }

    let store = open_store(registry)?;
    let lock = store.lock();
    match lock.force_clear()? {
        LockState::Unlocked => println!("No lock to clear."),
        LockState::Corrupt { reason } => {
            println!("Cleared corrupt lock ({}).", reason);
            println!("  Path:       {}", lock.path().display());
        }
        LockState::Held(info) => {
            println!("Cleared lock.");
            println!();
            println!("Lock details:");
            print!("{}", render_holder(&info, "  "));
            if info.is_stale {
                println!("  Status:     was STALE");
            }
            println!("  Path:       {}", lock.path().display());
        }
    }
    Ok(())
}

fn render_status(path: &Path, state: &LockState) -> String {
    let mut out = String::new();
    match state {
        LockState::Unlocked => {
            let _ = writeln!(out, "Unlocked.");
        }
        LockState::Corrupt { reason } => {
            let _ = writeln!(out, "Lock marker is corrupt: {}", reason);
            let _ = writeln!(out, "  Path:       {}", path.display());
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "The next writer will reclaim it. To remove it now, run `stm lock clear --force`."
            );
        }
        LockState::Held(info) => {
            let _ = writeln!(out, "Locked:");
            out.push_str(&render_holder(info, "  "));
            if info.is_stale {
                let _ = writeln!(out, "  Status:     STALE");
            }
            let _ = writeln!(out, "  Path:       {}", path.display());
            if info.is_stale || info.holder_alive == Some(false) {
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "Note: the holder appears abandoned. Use `stm lock clear --force` to clear."
                );
            }
        }
    }
    out
}

fn render_holder(info: &LockInfo, indent: &str) -> String {
    let descriptor = &info.descriptor;
    let mut out = String::new();
    let _ = writeln!(out, "{}PID:        {}", indent, descriptor.pid);
    let _ = writeln!(out, "{}Command:    {}", indent, descriptor.command);
    if let Some(host) = &descriptor.host {
        let _ = writeln!(out, "{}Host:       {}", indent, host);
    }
    if let Some(acquired) = DateTime::from_timestamp_millis(descriptor.timestamp) {
        let _ = writeln!(
            out,
            "{}Acquired:   {}",
            indent,
            acquired.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    let _ = writeln!(out, "{}Held by:    {}", indent, info);
    match info.holder_alive {
        Some(true) => {
            let _ = writeln!(out, "{}Process:    running", indent);
        }
        Some(false) => {
            let _ = writeln!(out, "{}Process:    not running", indent);
        }
        None => {
            let _ = writeln!(out, "{}Process:    unknown (different host)", indent);
        }
    }
    out
}
