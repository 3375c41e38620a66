//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{Result, StmError};
use crate::locks::LockSettings;
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(StmError::User)` - Parse error or validation failure
    /// * `Err(StmError::StorageIo)` - The file could not be read
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content =
            std::fs::read_to_string(path).map_err(|e| StmError::io("read config file", path, e))?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| StmError::User(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| StmError::User(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `tasks_dir` must be a non-empty relative path without `..`
    /// - size limits must be positive
    /// - `lock_retry_interval_ms` must be positive and not exceed `lock_timeout_ms`
    /// - `lock_stale_ms` must be positive
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> {
            Err(StmError::User(format!("config validation failed: {}", msg)))
        };

        let tasks_dir = Path::new(&self.tasks_dir);
        if self.tasks_dir.trim().is_empty() {
            return invalid("tasks_dir must not be empty");
        }
        if tasks_dir.is_absolute() || self.tasks_dir.split(['/', '\\']).any(|c| c == "..") {
            return invalid("tasks_dir must be a relative path inside the .stm directory");
        }

        if self.max_title_length == 0 {
            return invalid("max_title_length must be greater than 0");
        }
        if self.max_task_size_bytes == 0 {
            return invalid("max_task_size_bytes must be greater than 0");
        }

        if self.lock_retry_interval_ms == 0 {
            return invalid("lock_retry_interval_ms must be greater than 0");
        }
        if self.lock_retry_interval_ms > self.lock_timeout_ms {
            return invalid("lock_retry_interval_ms must not exceed lock_timeout_ms");
        }
        if self.lock_stale_ms == 0 {
            return invalid("lock_stale_ms must be greater than 0");
        }
        if self.lock_timeout_ms >= self.lock_stale_ms {
            return invalid("lock_timeout_ms must be less than lock_stale_ms");
        }

        Ok(())
    }

    /// Lock timing derived from this config.
    pub fn lock_settings(&self) -> LockSettings {
        LockSettings {
            timeout: Duration::from_millis(self.lock_timeout_ms),
            retry_interval: Duration::from_millis(self.lock_retry_interval_ms),
            stale_after: Duration::from_millis(self.lock_stale_ms),
            dead_holder_grace: Duration::from_millis(self.lock_grace_ms),
        }
    }
}
