//! Implementation of the `stm update` command.

use super::{clean_list, open_store, parse_fields, parse_ids};
use crate::cli::UpdateArgs;
use crate::error::{Result, StmError};
use crate::locks::LockRegistry;
use crate::task::{TaskPatch, TaskStatus};

/// Execute the `stm update` command.
pub fn cmd_update(args: UpdateArgs, registry: &LockRegistry) -> Result<()> {
    let id = args.id;
    let patch = build_patch(args)?;
    if patch.is_empty() {
        return Err(StmError::User(format!(
            "nothing to update for task {}.\n\
             Pass at least one of --title, --status, --tags, --deps, --body, --field, --unset.",
            id
        )));
    }

    let store = open_store(registry)?;
    let task = store.update(id, patch)?;

    println!("Updated task {}: {}", task.id(), task.meta.title);
    Ok(())
}

fn build_patch(args: UpdateArgs) -> Result<TaskPatch> {
    Ok(TaskPatch {
        title: args.title,
        status: args
            .status
            .as_deref()
            .map(str::parse::<TaskStatus>)
            .transpose()?,
        tags: args.tags.map(clean_list),
        dependencies: args.deps.map(parse_ids).transpose()?,
        body: args.body,
        set_extra: parse_fields(&args.fields)?,
        unset_extra: clean_list(args.unset),
    })
}
