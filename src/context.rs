//! Workspace resolution for stm.
//!
//! A workspace is a directory containing `.stm/`. Commands run from any
//! subdirectory resolve to the nearest ancestor that has one; if none does,
//! the current directory is the workspace root (which is where `stm init`
//! creates it).

use crate::config::Config;
use crate::error::{Result, StmError};
use std::env;
use std::path::{Path, PathBuf};

/// Workspace state directory name.
pub const STATE_DIR: &str = ".stm";

/// Config file name within the state directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Lock marker name within the state directory.
pub const LOCK_FILE: &str = "lock";

/// Resolved paths for a stm workspace. All paths are absolute.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory that contains (or will contain) `.stm/`.
    pub root: PathBuf,

    /// The `.stm/` directory.
    pub state_dir: PathBuf,
}

impl Workspace {
    /// Resolve the workspace from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            StmError::User(format!("failed to get current working directory: {}", e))
        })?;

        Ok(Self::resolve_from(&cwd))
    }

    /// Resolve the workspace from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Self {
        let cwd = cwd.as_ref();
        let root = cwd
            .ancestors()
            .find(|dir| dir.join(STATE_DIR).is_dir())
            .unwrap_or(cwd)
            .to_path_buf();

        Self {
            state_dir: root.join(STATE_DIR),
            root,
        }
    }

    /// Check if `.stm/` exists.
    pub fn exists(&self) -> bool {
        self.state_dir.is_dir()
    }

    /// Ensure the workspace is initialized, returning an error if not.
    ///
    /// Called by every command except `init`.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.exists() {
            return Err(StmError::User(format!(
                "stm workspace not initialized.\n\
                 Expected state directory at: {}\n\n\
                 Run `stm init` to create it.",
                self.state_dir.display()
            )));
        }
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    /// Get the path to the workspace lock marker.
    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join(LOCK_FILE)
    }

    /// Get the tasks directory configured by `config`.
    pub fn tasks_dir(&self, config: &Config) -> PathBuf {
        self.state_dir.join(&config.tasks_dir)
    }

    /// Load `config.yaml`, falling back to defaults when it is absent.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }
}

/// Resolve the workspace and ensure it is initialized.
pub fn require_initialized_workspace() -> Result<Workspace> {
    let workspace = Workspace::resolve()?;
    workspace.ensure_initialized()?;
    Ok(workspace)
}
