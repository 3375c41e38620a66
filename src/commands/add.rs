//! Implementation of the `stm add` command.

use super::{clean_list, open_store, parse_fields, parse_ids};
use crate::cli::AddArgs;
use crate::error::Result;
use crate::locks::LockRegistry;
use crate::task::{NewTask, TaskStatus};

/// Execute the `stm add` command.
///
/// Arguments are converted and validated before the store takes its lock.
pub fn cmd_add(args: AddArgs, registry: &LockRegistry) -> Result<()> {
    let input = NewTask {
        title: args.title,
        body: args.body.unwrap_or_default(),
        status: args.status.parse::<TaskStatus>()?,
        tags: clean_list(args.tags),
        dependencies: parse_ids(args.deps)?,
        extra: parse_fields(&args.fields)?,
    };

    let store = open_store(registry)?;
    let task = store.create(input)?;

    println!("Created task {}: {}", task.id(), task.meta.title);
    Ok(())
}
