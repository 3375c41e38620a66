//! Implementation of the `stm init` command.
//!
//! # What `stm init` does
//!
//! 1. Creates `.stm/` in the current directory
//! 2. Writes a default `config.yaml` (if missing)
//! 3. Creates the configured tasks directory
//!
//! Running it inside an existing workspace leaves existing files untouched.

use crate::config::Config;
use crate::context::{STATE_DIR, Workspace};
use crate::error::{Result, StmError};
use crate::fs::atomic_write;
use std::env;
use std::fs;
use tracing::debug;

/// Execute the `stm init` command.
pub fn cmd_init() -> Result<()> {
    let cwd = env::current_dir().map_err(|e| {
        StmError::User(format!("failed to get current working directory: {}", e))
    })?;

    // Always initialize here, even when an ancestor already has a workspace.
    let workspace = Workspace {
        state_dir: cwd.join(STATE_DIR),
        root: cwd,
    };
    let existed = workspace.exists();

    fs::create_dir_all(&workspace.state_dir)
        .map_err(|e| StmError::io("create state directory", &workspace.state_dir, e))?;

    let config_path = workspace.config_path();
    let config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        let config = Config::default();
        atomic_write(&config_path, config.to_yaml()?.as_bytes())?;
        debug!(path = %config_path.display(), "wrote default config");
        config
    };

    let tasks_dir = workspace.tasks_dir(&config);
    fs::create_dir_all(&tasks_dir)
        .map_err(|e| StmError::io("create tasks directory", &tasks_dir, e))?;

    if existed {
        println!("stm workspace already initialized.");
    } else {
        println!("Initialized stm workspace.");
    }
    println!();
    println!("State directory: {}", workspace.state_dir.display());
    println!("Tasks directory: {}", tasks_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DirGuard;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_init_creates_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        cmd_init().unwrap();

        let state = temp_dir.path().join(".stm");
        assert!(state.is_dir());
        assert!(state.join("tasks").is_dir());
        let config = Config::load(state.join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(!state.join("lock").exists());
    }

    #[test]
    #[serial]
    fn test_init_is_idempotent_and_keeps_config() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        cmd_init().unwrap();
        let config_path = temp_dir.path().join(".stm/config.yaml");
        fs::write(&config_path, "tasks_dir: records\n").unwrap();
        fs::write(temp_dir.path().join(".stm/tasks/1-keep.md"), "x").unwrap();

        cmd_init().unwrap();

        assert_eq!(
            fs::read_to_string(&config_path).unwrap(),
            "tasks_dir: records\n"
        );
        assert!(temp_dir.path().join(".stm/records").is_dir());
        assert!(temp_dir.path().join(".stm/tasks/1-keep.md").exists());
    }

    #[test]
    #[serial]
    fn test_init_rejects_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let _guard = DirGuard::new(temp_dir.path());

        fs::create_dir(temp_dir.path().join(".stm")).unwrap();
        fs::write(
            temp_dir.path().join(".stm/config.yaml"),
            "tasks_dir: ../outside\n",
        )
        .unwrap();

        assert!(cmd_init().is_err());
        assert!(!temp_dir.path().join("outside").exists());
    }
}
