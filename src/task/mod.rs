//! Task model for stm.
//!
//! A task is persisted as one markdown file: a YAML frontmatter block followed
//! by a free-form body. This module provides:
//!
//! - The typed core fields plus an ordered map of unknown fields, which are
//!   carried through read-modify-write untouched
//! - Conversion between frontmatter mappings and [`TaskMeta`], reporting
//!   missing or mistyped required fields by name
//! - Input validation for new tasks and patches
//!
//! # Task File Format
//!
//! ```text
//! ---
//! schema: 1
//! id: 12
//! title: Implement feature
//! status: pending
//! created: 2026-01-13T10:00:00.000Z
//! updated: 2026-01-13T10:00:00.000Z
//! tags: []
//! dependencies: []
//! ---
//! Description of the task...
//! ```

use crate::config::Config;
use crate::error::{Result, StmError};
use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

pub mod codec;
mod io;
mod patch;

pub(crate) use io::read_id;
pub use patch::{TaskPatch, parse_field};

/// Current task file format version.
pub const TASK_SCHEMA: u32 = 1;

/// Key under which rendered views (e.g. JSON) carry the body, reserved in the
/// extension map alongside [`CORE_FIELDS`].
pub const BODY_FIELD: &str = "body";

/// Frontmatter keys owned by the typed core fields.
///
/// Callers cannot set these through the extension map.
pub const CORE_FIELDS: &[&str] = &[
    "schema",
    "id",
    "title",
    "status",
    "created",
    "updated",
    "tags",
    "dependencies",
];

/// Task status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = StmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(StmError::Validation(format!(
                "invalid status '{}': must be 'pending', 'in-progress', or 'done'",
                s
            ))),
        }
    }
}

/// Task frontmatter.
///
/// Known fields are explicitly typed; everything else lives in `extra`, in
/// the order it appeared in the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskMeta {
    /// Task file format version.
    pub schema: u32,

    /// Task identifier, immutable after creation.
    pub id: u64,

    /// Task title, also used to derive the filename.
    pub title: String,

    pub status: TaskStatus,

    pub created: DateTime<Utc>,

    /// Refreshed on every update; never earlier than `created`.
    pub updated: DateTime<Utc>,

    pub tags: Vec<String>,

    /// Ids of tasks this one depends on. Existence is not checked here.
    pub dependencies: Vec<u64>,

    /// Caller-defined fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl TaskMeta {
    /// Build metadata from a decoded frontmatter mapping.
    ///
    /// `schema`, `id`, `title`, `status`, `created` and `updated` are
    /// required; `tags` and `dependencies` default to empty lists.
    pub fn from_mapping(mapping: Mapping) -> Result<Self> {
        let mut core = Mapping::new();
        let mut extra = Mapping::new();
        for (key, value) in mapping {
            let is_core = key.as_str().is_some_and(|name| CORE_FIELDS.contains(&name));
            if is_core {
                core.insert(key, value);
            } else {
                extra.insert(key, value);
            }
        }

        Ok(Self {
            schema: required(&core, "schema")?,
            id: required(&core, "id")?,
            title: required(&core, "title")?,
            status: required(&core, "status")?,
            created: required(&core, "created")?,
            updated: required(&core, "updated")?,
            tags: optional(&core, "tags")?.unwrap_or_default(),
            dependencies: optional(&core, "dependencies")?.unwrap_or_default(),
            extra,
        })
    }
}

fn optional<T: DeserializeOwned>(mapping: &Mapping, field: &str) -> Result<Option<T>> {
    match mapping.get(field) {
        None => Ok(None),
        Some(value) => serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|e| StmError::Validation(format!("invalid field '{}': {}", field, e))),
    }
}

fn required<T: DeserializeOwned>(mapping: &Mapping, field: &str) -> Result<T> {
    match mapping.get(field) {
        None | Some(Value::Null) => Err(StmError::Validation(format!(
            "missing required field '{}'",
            field
        ))),
        Some(_) => optional(mapping, field)?.ok_or_else(|| {
            StmError::Validation(format!("missing required field '{}'", field))
        }),
    }
}

/// A parsed task: frontmatter plus the body exactly as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub meta: TaskMeta,
    /// Everything after the closing frontmatter delimiter, byte for byte.
    pub body: String,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub body: String,
    pub status: TaskStatus,
    pub tags: Vec<String>,
    pub dependencies: Vec<u64>,
    /// Additional frontmatter fields; keys must not collide with [`CORE_FIELDS`].
    pub extra: Mapping,
}

impl NewTask {
    /// A pending task with the given title and an empty body.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Task {
    /// Materialize a new task with `id`, stamped `created == updated == now`.
    pub fn new(id: u64, input: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            meta: TaskMeta {
                schema: TASK_SCHEMA,
                id,
                title: input.title,
                status: input.status,
                created: now,
                updated: now,
                tags: input.tags,
                dependencies: input.dependencies,
                extra: input.extra,
            },
            body: input.body,
        }
    }

    pub fn id(&self) -> u64 {
        self.meta.id
    }

    /// Parse a task from file content.
    pub fn parse(content: &str) -> Result<Self> {
        let (mapping, body) = codec::decode(content)?;
        let meta = TaskMeta::from_mapping(mapping)?;
        Ok(Self { meta, body })
    }

    /// Serialize the task to file content.
    pub fn to_text(&self) -> Result<String> {
        codec::encode(&self.meta, &self.body)
    }
}

/// Current time at the precision stored in task files.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Size limits applied to caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLimits {
    pub max_title_length: usize,
    pub max_body_bytes: usize,
}

impl Default for TaskLimits {
    fn default() -> Self {
        TaskLimits::from(&Config::default())
    }
}

impl From<&Config> for TaskLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_title_length: config.max_title_length,
            max_body_bytes: config.max_task_size_bytes,
        }
    }
}

impl TaskLimits {
    /// Validate a title: non-empty after trimming and within the length limit.
    pub fn validate_title(&self, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(StmError::Validation("title must not be empty".to_string()));
        }
        let length = title.chars().count();
        if length > self.max_title_length {
            return Err(StmError::Validation(format!(
                "title is {} characters long; the limit is {}",
                length, self.max_title_length
            )));
        }
        Ok(())
    }

    /// Validate a body against the size limit.
    pub fn validate_body(&self, body: &str) -> Result<()> {
        if body.len() > self.max_body_bytes {
            return Err(StmError::Validation(format!(
                "body is {} bytes; the limit is {}",
                body.len(),
                self.max_body_bytes
            )));
        }
        Ok(())
    }

    /// Validate everything needed to create a task.
    pub fn validate_new(&self, input: &NewTask) -> Result<()> {
        self.validate_title(&input.title)?;
        self.validate_body(&input.body)?;
        validate_extra_keys(input.extra.keys())
    }
}

/// Reject extension keys that are not strings or that shadow a core field.
pub fn validate_extra_keys<'a>(keys: impl IntoIterator<Item = &'a Value>) -> Result<()> {
    for key in keys {
        match key.as_str() {
            Some(name) if CORE_FIELDS.contains(&name) || name == BODY_FIELD => {
                return Err(StmError::Validation(format!(
                    "field '{}' is managed by stm and cannot be set directly",
                    name
                )));
            }
            Some(name) if name.trim().is_empty() => {
                return Err(StmError::Validation(
                    "field names must not be empty".to_string(),
                ));
            }
            Some(_) => {}
            None => {
                return Err(StmError::Validation(format!(
                    "field names must be strings (found {:?})",
                    key
                )));
            }
        }
    }
    Ok(())
}
