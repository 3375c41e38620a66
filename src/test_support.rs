use crate::config::Config;
use crate::context::Workspace;
use crate::locks::LockRegistry;
use crate::store::TaskStore;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// A temp directory with an initialized `.stm/` workspace using defaults.
pub(crate) fn create_test_workspace() -> (TempDir, Workspace) {
    let temp_dir = TempDir::new().unwrap();
    let workspace = Workspace::resolve_from(temp_dir.path());
    let config = Config::default();
    std::fs::create_dir_all(workspace.tasks_dir(&config)).unwrap();
    std::fs::write(workspace.config_path(), config.to_yaml().unwrap()).unwrap();
    (temp_dir, workspace)
}

/// A store over a fresh workspace with a short lock timeout.
pub(crate) fn create_test_store() -> (TempDir, TaskStore) {
    let (temp_dir, workspace) = create_test_workspace();
    let config = Config {
        lock_timeout_ms: 2000,
        lock_retry_interval_ms: 10,
        ..Config::default()
    };
    let store = TaskStore::open(&workspace, &config, LockRegistry::new());
    (temp_dir, store)
}
