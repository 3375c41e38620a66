//! Partial updates to an existing task.

use super::{CORE_FIELDS, Task, TaskLimits, TaskStatus, validate_extra_keys};
use crate::error::{Result, StmError};
use chrono::{DateTime, Utc};
use serde_yaml::{Mapping, Value};

/// Changes to apply to a task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub tags: Option<Vec<String>>,
    pub dependencies: Option<Vec<u64>>,
    pub body: Option<String>,
    /// Extension fields to insert or overwrite.
    pub set_extra: Mapping,
    /// Extension fields to remove.
    pub unset_extra: Vec<String>,
}

impl TaskPatch {
    /// True when applying the patch would change nothing but `updated`.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.tags.is_none()
            && self.dependencies.is_none()
            && self.body.is_none()
            && self.set_extra.is_empty()
            && self.unset_extra.is_empty()
    }

    /// Validate the patch without touching the store.
    pub fn validate(&self, limits: &TaskLimits) -> Result<()> {
        if let Some(title) = &self.title {
            limits.validate_title(title)?;
        }
        if let Some(body) = &self.body {
            limits.validate_body(body)?;
        }
        validate_extra_keys(self.set_extra.keys())?;

        for key in &self.unset_extra {
            if CORE_FIELDS.contains(&key.as_str()) {
                return Err(StmError::Validation(format!(
                    "field '{}' is managed by stm and cannot be removed",
                    key
                )));
            }
            if self.set_extra.contains_key(key.as_str()) {
                return Err(StmError::Validation(format!(
                    "field '{}' is both set and unset",
                    key
                )));
            }
        }
        Ok(())
    }
}

impl Task {
    /// Merge `patch` into this task.
    ///
    /// `id` and `created` never change. `updated` becomes `now`, clamped so it
    /// is never earlier than `created`. Extension fields keep their position
    /// when overwritten; new ones are appended.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        let meta = &mut self.meta;
        if let Some(title) = patch.title {
            meta.title = title;
        }
        if let Some(status) = patch.status {
            meta.status = status;
        }
        if let Some(tags) = patch.tags {
            meta.tags = tags;
        }
        if let Some(dependencies) = patch.dependencies {
            meta.dependencies = dependencies;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }

        if !patch.unset_extra.is_empty() {
            let extra = std::mem::take(&mut meta.extra);
            meta.extra = extra
                .into_iter()
                .filter(|(key, _)| {
                    !key.as_str()
                        .is_some_and(|name| patch.unset_extra.iter().any(|u| u == name))
                })
                .collect();
        }
        for (key, value) in patch.set_extra {
            if let Some(slot) = meta.extra.get_mut(&key) {
                *slot = value;
            } else {
                meta.extra.insert(key, value);
            }
        }

        meta.updated = now.max(meta.created);
    }
}

/// Parse a `key=value` pair into an extension field.
///
/// The value is read as YAML so `--field points=3` stores a number and
/// `--field note=hello` stores a string.
pub fn parse_field(field: &str) -> Result<(Value, Value)> {
    let (key, raw) = field.split_once('=').ok_or_else(|| {
        StmError::Validation(format!("invalid field '{}': expected key=value", field))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(StmError::Validation(format!(
            "invalid field '{}': key must not be empty",
            field
        )));
    }

    let value = if raw.is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    };
    Ok((Value::String(key.to_string()), value))
}
