//! Command implementations for stm.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus argument conversions shared between commands.

mod add;
mod delete;
mod init;
mod lock;
mod show;
mod update;

use crate::cli::{Command, LockAction};
use crate::context::require_initialized_workspace;
use crate::error::{Result, StmError};
use crate::locks::LockRegistry;
use crate::store::TaskStore;
use crate::task::parse_field;
use serde_yaml::Mapping;

/// Dispatch a command to its implementation.
///
/// Every lock taken while running the command is tracked by `registry`.
pub fn dispatch(command: Command, registry: &LockRegistry) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Add(args) => add::cmd_add(args, registry),
        Command::List(args) => show::cmd_list(args, registry),
        Command::Show(args) => show::cmd_show(args, registry),
        Command::Update(args) => update::cmd_update(args, registry),
        Command::Delete(args) => delete::cmd_delete(args, registry),
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::Status => lock::cmd_lock_status(registry),
            LockAction::Clear(args) => lock::cmd_lock_clear(args, registry),
        },
    }
}

/// Open the store of the workspace containing the current directory.
fn open_store(registry: &LockRegistry) -> Result<TaskStore> {
    let workspace = require_initialized_workspace()?;
    let config = workspace.load_config()?;
    Ok(TaskStore::open(&workspace, &config, registry.clone()))
}

/// Trim list items and drop empty ones, so `--tags ""` means "no tags".
fn clean_list(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse dependency ids given on the command line.
fn parse_ids(raw: Vec<String>) -> Result<Vec<u64>> {
    clean_list(raw)
        .into_iter()
        .map(|item| {
            item.parse::<u64>().map_err(|_| {
                StmError::Validation(format!(
                    "invalid dependency '{}': must be a task id (a non-negative integer)",
                    item
                ))
            })
        })
        .collect()
}

/// Parse repeated `--field key=value` options into an ordered mapping.
fn parse_fields(raw: &[String]) -> Result<Mapping> {
    let mut fields = Mapping::new();
    for field in raw {
        let (key, value) = parse_field(field)?;
        fields.insert(key, value);
    }
    Ok(fields)
}
