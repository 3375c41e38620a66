//! stm: a simple task manager that stores each task as a markdown file.
//!
//! This is the main entry point for the `stm` CLI. It parses arguments,
//! sets up logging and lock cleanup, dispatches to the appropriate command
//! handler, and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod locks;
mod logging;
pub mod store;
pub mod task;

#[cfg(test)]
mod test_support;

use cli::Cli;
use locks::LockRegistry;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    let registry = LockRegistry::new();
    if let Err(err) = registry.install_shutdown_hooks() {
        tracing::warn!(error = %err, "lock cleanup on interrupt is unavailable");
    }

    let result = commands::dispatch(cli.command, &registry);
    registry.release_all();

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            // Return appropriate exit code
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
