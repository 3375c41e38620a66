//! Tests for the task store.

use super::*;
use crate::locks::{LockDescriptor, LockSettings};
use crate::task::{NewTask, TaskPatch, TaskStatus};
use crate::test_support::create_test_store;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn file_names(store: &TaskStore) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(store.tasks_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn write_raw(store: &TaskStore, name: &str, content: &str) {
    fs::write(store.tasks_dir().join(name), content).unwrap();
}

fn raw_task(id: u64, title: &str) -> String {
    format!(
        "---\nschema: 1\nid: {}\ntitle: {}\nstatus: pending\ncreated: 2026-01-13T10:00:00Z\nupdated: 2026-01-13T10:00:00Z\n---\n",
        id, title
    )
}

#[test]
fn test_sequential_ids_never_reuse_deleted_max() {
    let (_temp, store) = create_test_store();

    assert_eq!(store.create(NewTask::titled("First")).unwrap().id(), 1);
    assert_eq!(store.create(NewTask::titled("Second")).unwrap().id(), 2);

    store.delete(1).unwrap();
    assert_eq!(store.create(NewTask::titled("Third")).unwrap().id(), 3);

    assert_eq!(file_names(&store), vec!["2-second.md", "3-third.md"]);
}

#[test]
fn test_create_writes_expected_file() {
    let (_temp, store) = create_test_store();

    let mut input = NewTask::titled("Write the docs!");
    input.body = "Line one\nno trailing newline".to_string();
    input.status = TaskStatus::InProgress;
    input.tags = vec!["docs".to_string(), "docs".to_string()];
    input.dependencies = vec![9];
    input.extra.insert(Value::from("owner"), Value::from("sam"));

    let task = store.create(input).unwrap();
    assert_eq!(task.id(), 1);
    assert_eq!(task.meta.created, task.meta.updated);

    let path = store.tasks_dir().join("1-write-the-docs.md");
    assert!(path.exists());

    let loaded = store.get(1).unwrap();
    assert_eq!(loaded, task);
    assert_eq!(loaded.body, "Line one\nno trailing newline");
    assert_eq!(loaded.meta.tags, vec!["docs", "docs"]);
    assert_eq!(loaded.meta.extra.get("owner"), Some(&Value::from("sam")));
}

#[test]
fn test_create_releases_lock() {
    let (_temp, store) = create_test_store();
    store.create(NewTask::titled("One")).unwrap();
    assert!(!store.lock().path().exists());
}

#[test]
fn test_create_skips_past_taken_filenames() {
    let (_temp, store) = create_test_store();

    // Directories are not task files, so allocation ignores them, but they
    // still occupy the target filename.
    fs::create_dir(store.tasks_dir().join("1-x.md")).unwrap();
    fs::create_dir(store.tasks_dir().join("2-x.md")).unwrap();

    let task = store.create(NewTask::titled("x")).unwrap();
    assert_eq!(task.id(), 3);
    assert!(store.tasks_dir().join("3-x.md").is_file());

    for id in 4..=13 {
        fs::create_dir(store.tasks_dir().join(format!("{}-y.md", id))).unwrap();
    }

    let err = store.create(NewTask::titled("y")).unwrap_err();
    assert!(matches!(err, StmError::Integrity(_)));
    assert_eq!(
        err.to_string(),
        "Integrity error: could not create task after 10 attempts \
         (0 id collisions, 10 filename collisions)"
    );
    assert!(!store.lock().path().exists());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_corrupt_highest_file_reserves_its_id() {
    let (_temp, store) = create_test_store();
    write_raw(&store, "5-old.md", &raw_task(5, "Old"));
    write_raw(&store, "6-broken.md", "---\nid: [this is not yaml\n---\n");

    let task = store.create(NewTask::titled("New")).unwrap();
    assert_eq!(task.id(), 7);
    assert!(store.tasks_dir().join("7-new.md").exists());
}

#[test]
fn test_mismatched_metadata_triggers_full_scan() {
    let (_temp, store) = create_test_store();
    write_raw(&store, "2-b.md", &raw_task(20, "B"));
    write_raw(&store, "4-d.md", &raw_task(9, "D"));

    let task = store.create(NewTask::titled("Next")).unwrap();
    assert_eq!(task.id(), 21);
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    let (_temp, store) = create_test_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.create(NewTask::titled(format!("Task {}", i))).unwrap())
        })
        .collect();

    let ids: BTreeSet<u64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().id())
        .collect();
    assert_eq!(ids, (1..=10).collect::<BTreeSet<u64>>());
    assert_eq!(store.list().unwrap().len(), 10);
    assert_eq!(file_names(&store).len(), 10);
}

#[test]
fn test_validation_failure_takes_no_lock() {
    let (_temp, store) = create_test_store();

    let err = store.create(NewTask::titled("   ")).unwrap_err();
    assert!(matches!(err, StmError::Validation(_)));

    let long = "x".repeat(201);
    assert!(store.create(NewTask::titled(long)).is_err());

    assert!(!store.lock().path().exists());
    assert!(file_names(&store).is_empty());
}

#[test]
fn test_create_times_out_while_lock_held() {
    let (temp, _) = create_test_store();
    let lock_path = temp.path().join(".stm").join("lock");
    let settings = LockSettings {
        timeout: Duration::from_millis(150),
        retry_interval: Duration::from_millis(10),
        ..LockSettings::default()
    };
    let store = TaskStore::new(
        temp.path().join(".stm").join("tasks"),
        &lock_path,
        settings,
        TaskLimits::default(),
        LockRegistry::new(),
    );

    let holder = LockDescriptor::current();
    fs::write(&lock_path, holder.to_json().unwrap()).unwrap();

    let err = store.create(NewTask::titled("Blocked")).unwrap_err();
    assert!(matches!(err, StmError::LockTimeout(_)));
    assert!(file_names(&store).is_empty());
    // The foreign marker is left in place.
    assert!(lock_path.exists());
}

#[test]
fn test_create_recreates_missing_tasks_dir() {
    let (_temp, store) = create_test_store();
    fs::remove_dir_all(store.tasks_dir()).unwrap();

    assert_eq!(store.create(NewTask::titled("Again")).unwrap().id(), 1);
}

#[test]
fn test_get_reports_missing_and_mismatched() {
    let (_temp, store) = create_test_store();
    assert!(matches!(store.get(1).unwrap_err(), StmError::NotFound(1)));

    write_raw(&store, "3-x.md", &raw_task(4, "X"));
    let err = store.get(3).unwrap_err();
    assert!(matches!(err, StmError::Integrity(_)));
    assert!(err.to_string().contains("metadata says id 4"));
}

#[test]
fn test_duplicate_filename_ids_are_an_integrity_error() {
    let (_temp, store) = create_test_store();
    write_raw(&store, "3-a.md", &raw_task(3, "A"));
    write_raw(&store, "3-b.md", &raw_task(3, "B"));

    let err = store.get(3).unwrap_err();
    assert!(matches!(err, StmError::Integrity(_)));
}

#[test]
fn test_list_sorts_and_skips_unreadable() {
    let (_temp, store) = create_test_store();
    write_raw(&store, "10-ten.md", &raw_task(10, "Ten"));
    write_raw(&store, "2-two.md", &raw_task(2, "Two"));
    write_raw(&store, "5-bad.md", "---\ntitle: [broken\n---\n");
    write_raw(&store, "notes.md", "just notes");

    let ids: Vec<u64> = store.list().unwrap().iter().map(Task::id).collect();
    assert_eq!(ids, vec![2, 10]);
}

#[test]
fn test_list_empty_and_missing_dir() {
    let (_temp, store) = create_test_store();
    assert!(store.list().unwrap().is_empty());

    fs::remove_dir_all(store.tasks_dir()).unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_update_renames_and_preserves_identity() {
    let (_temp, store) = create_test_store();
    write_raw(
        &store,
        "1-original.md",
        "---\nschema: 1\nid: 1\ntitle: Original\nstatus: pending\ncreated: 2026-01-13T10:00:00Z\nupdated: 2026-01-13T10:00:00Z\nzeta: last\nalpha: first\n---\nkeep me\n\n",
    );

    let updated = store
        .update(
            1,
            TaskPatch {
                title: Some("Renamed task".to_string()),
                status: Some(TaskStatus::Done),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert_eq!(file_names(&store), vec!["1-renamed-task.md"]);
    assert_eq!(updated.id(), 1);
    assert!(updated.meta.updated > updated.meta.created);

    let loaded = store.get(1).unwrap();
    assert_eq!(loaded, updated);
    assert_eq!(loaded.meta.created.to_rfc3339(), "2026-01-13T10:00:00+00:00");
    assert_eq!(loaded.body, "keep me\n\n");
    let keys: Vec<&str> = loaded.meta.extra.keys().filter_map(Value::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha"]);
    assert!(!store.lock().path().exists());
}

#[test]
fn test_update_in_place_when_title_unchanged() {
    let (_temp, store) = create_test_store();
    store.create(NewTask::titled("Stay")).unwrap();

    let updated = store
        .update(
            1,
            TaskPatch {
                body: Some("new body".to_string()),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.body, "new body");
    assert_eq!(file_names(&store), vec!["1-stay.md"]);
}

#[test]
fn test_update_errors() {
    let (_temp, store) = create_test_store();
    assert!(matches!(
        store.update(1, TaskPatch::default()).unwrap_err(),
        StmError::NotFound(1)
    ));

    store.create(NewTask::titled("Target")).unwrap();
    let bad = TaskPatch {
        unset_extra: vec!["id".to_string()],
        ..TaskPatch::default()
    };
    assert!(matches!(
        store.update(1, bad).unwrap_err(),
        StmError::Validation(_)
    ));
}

#[test]
fn test_delete() {
    let (_temp, store) = create_test_store();
    store.create(NewTask::titled("Doomed")).unwrap();

    store.delete(1).unwrap();
    assert!(matches!(store.get(1).unwrap_err(), StmError::NotFound(1)));
    assert!(matches!(store.delete(1).unwrap_err(), StmError::NotFound(1)));
    assert!(file_names(&store).is_empty());
}
