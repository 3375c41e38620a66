//! Implementation of the `stm delete` command.

use super::open_store;
use crate::cli::DeleteArgs;
use crate::error::Result;
use crate::locks::LockRegistry;

/// Execute the `stm delete` command.
pub fn cmd_delete(args: DeleteArgs, registry: &LockRegistry) -> Result<()> {
    let store = open_store(registry)?;
    store.delete(args.id)?;
    println!("Deleted task {}", args.id);
    Ok(())
}
