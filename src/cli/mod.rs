//! CLI argument parsing for stm.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// stm: a simple task manager that keeps each task in a markdown file.
///
/// Tasks live in `.stm/tasks/` as `{id}-{slug}.md` files with YAML
/// frontmatter. Concurrent invocations are serialized by a lock file, so
/// parallel scripts never hand out the same id twice.
#[derive(Parser, Debug)]
#[command(name = "stm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log protocol details (lock waits, id allocation) to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for stm.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a workspace in the current directory.
    ///
    /// Creates `.stm/`, the tasks directory, and a default config.yaml.
    Init,

    /// Add a new task.
    Add(AddArgs),

    /// List all tasks, ordered by id.
    List(ListArgs),

    /// Show one task.
    Show(ShowArgs),

    /// Update fields of an existing task.
    ///
    /// Only the options given are changed. Renaming a task renames its file.
    Update(UpdateArgs),

    /// Delete a task.
    Delete(DeleteArgs),

    /// Workspace lock commands.
    ///
    /// Inspect or clear the lock that serializes writers.
    Lock(LockCommand),
}

/// Arguments for the `add` command.
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Task title.
    pub title: String,

    /// Initial status (pending, in-progress, done).
    #[arg(short, long, default_value = "pending")]
    pub status: String,

    /// Comma-separated tags.
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Comma-separated ids of tasks this one depends on.
    #[arg(long, value_delimiter = ',')]
    pub deps: Vec<String>,

    /// Task body (markdown).
    #[arg(short, long)]
    pub body: Option<String>,

    /// Extra frontmatter field as key=value (repeatable).
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print tasks as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Task id.
    pub id: u64,

    /// Print the task as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `update` command.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Task id.
    pub id: u64,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New status (pending, in-progress, done).
    #[arg(short, long)]
    pub status: Option<String>,

    /// Replace tags (comma-separated; pass "" to clear).
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Replace dependencies (comma-separated ids; pass "" to clear).
    #[arg(long, value_delimiter = ',')]
    pub deps: Option<Vec<String>>,

    /// Replace the body.
    #[arg(short, long)]
    pub body: Option<String>,

    /// Set an extra frontmatter field as key=value (repeatable).
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Remove an extra frontmatter field (repeatable).
    #[arg(long = "unset", value_name = "KEY")]
    pub unset: Vec<String>,
}

/// Arguments for the `delete` command.
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Task id.
    pub id: u64,
}

/// Lock management subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show who holds the workspace lock, if anyone.
    Status,

    /// Remove the workspace lock marker.
    ///
    /// Only use this when the holder is known to be gone.
    Clear(LockClearArgs),
}

/// Arguments for `lock clear`.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Clear the lock even if its holder looks alive.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
