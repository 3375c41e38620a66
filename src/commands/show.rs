//! Implementation of the `stm show` and `stm list` commands.
//!
//! Both render either a plain text view or JSON. Neither takes the lock.

use super::open_store;
use crate::cli::{ListArgs, ShowArgs};
use crate::error::{Result, StmError};
use crate::locks::LockRegistry;
use crate::task::{BODY_FIELD, Task, TaskMeta};
use serde::Serialize;
use serde_yaml::Value;
use std::borrow::Cow;
use std::fmt::Write as _;

/// JSON shape of a task: every frontmatter field plus the body.
#[derive(Serialize)]
struct TaskJson<'a> {
    #[serde(flatten)]
    meta: Cow<'a, TaskMeta>,
    body: &'a str,
}

/// Execute the `stm show` command.
pub fn cmd_show(args: ShowArgs, registry: &LockRegistry) -> Result<()> {
    let store = open_store(registry)?;
    let task = store.get(args.id)?;

    if args.json {
        println!("{}", to_json(&task_json(&task))?);
    } else {
        print!("{}", render_task(&task));
    }
    Ok(())
}

/// Execute the `stm list` command.
pub fn cmd_list(args: ListArgs, registry: &LockRegistry) -> Result<()> {
    let store = open_store(registry)?;
    let tasks = store.list()?;

    if args.json {
        let views: Vec<TaskJson<'_>> = tasks.iter().map(task_json).collect();
        println!("{}", to_json(&views)?);
    } else if tasks.is_empty() {
        println!("No tasks.");
    } else {
        print!("{}", render_list(&tasks));
    }
    Ok(())
}

fn task_json(task: &Task) -> TaskJson<'_> {
    // A hand-edited file may carry a `body` frontmatter key; the real body wins.
    let shadow = Value::from(BODY_FIELD);
    let meta = if task.meta.extra.contains_key(&shadow) {
        let mut meta = task.meta.clone();
        meta.extra.remove(&shadow);
        Cow::Owned(meta)
    } else {
        Cow::Borrowed(&task.meta)
    };
    TaskJson {
        meta,
        body: &task.body,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| StmError::User(format!("failed to render JSON: {}", e)))
}

/// One line per task: id, status, title.
fn render_list(tasks: &[Task]) -> String {
    let mut out = String::new();
    for task in tasks {
        let _ = writeln!(
            out,
            "{:>5}  {:<11}  {}",
            task.id(),
            task.meta.status.as_str(),
            task.meta.title
        );
    }
    out
}

fn render_task(task: &Task) -> String {
    let meta = &task.meta;
    let mut out = String::new();
    let rule = "=".repeat(80);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{} [{}]", meta.id, meta.status);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);
    let _ = writeln!(out, "Title:      {}", meta.title);
    let _ = writeln!(out, "Created:    {}", meta.created.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Updated:    {}", meta.updated.format("%Y-%m-%d %H:%M:%S UTC"));

    if !meta.tags.is_empty() {
        let _ = writeln!(out, "Tags:       {}", meta.tags.join(", "));
    }
    if !meta.dependencies.is_empty() {
        let deps: Vec<String> = meta.dependencies.iter().map(u64::to_string).collect();
        let _ = writeln!(out, "Depends on: {}", deps.join(", "));
    }

    if !meta.extra.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Fields:");
        for (key, value) in &meta.extra {
            let key = key.as_str().map(str::to_string).unwrap_or_else(|| format!("{:?}", key));
            let value = serde_yaml::to_string(value)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_else(|_| format!("{:?}", value));
            let _ = writeln!(out, "  {}: {}", key, value);
        }
    }

    if !task.body.is_empty() {
        let _ = writeln!(out);
        out.push_str(&task.body);
        if !task.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
