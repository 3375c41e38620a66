//! Drives the built `stm` binary from several processes at once.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn stm_command(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_stm"));
    command.current_dir(dir).env_remove("STM_LOG");
    command
}

fn stm(dir: &Path, args: &[&str]) -> Output {
    stm_command(dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run stm {}: {}", args.join(" "), e))
}

fn task_ids(dir: &Path) -> BTreeSet<u64> {
    fs::read_dir(dir.join(".stm/tasks"))
        .unwrap()
        .filter_map(|e| {
            let name = e.unwrap().file_name().to_string_lossy().into_owned();
            name.split('-').next()?.parse().ok()
        })
        .collect()
}

#[test]
fn ten_processes_get_distinct_ids() {
    let temp = TempDir::new().unwrap();
    assert!(stm(temp.path(), &["init"]).status.success());

    let children: Vec<_> = (0..10)
        .map(|i| {
            stm_command(temp.path())
                .args(["add", &format!("Parallel task {}", i)])
                .stdout(Stdio::null())
                .spawn()
                .unwrap()
        })
        .collect();

    for mut child in children {
        assert!(child.wait().unwrap().success());
    }

    assert_eq!(task_ids(temp.path()), (1..=10).collect::<BTreeSet<u64>>());
    assert!(!temp.path().join(".stm/lock").exists());
}

#[test]
fn exit_codes_distinguish_failures() {
    let temp = TempDir::new().unwrap();

    // Not initialized.
    assert_eq!(stm(temp.path(), &["list"]).status.code(), Some(1));

    assert!(stm(temp.path(), &["init"]).status.success());
    assert_eq!(stm(temp.path(), &["add", "  "]).status.code(), Some(2));
    assert_eq!(stm(temp.path(), &["show", "9"]).status.code(), Some(3));

    let output = stm(temp.path(), &["add", "Real task"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Created task 1: Real task"
    );

    let output = stm(temp.path(), &["show", "1", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["title"], "Real task");
}

#[test]
fn held_lock_times_out_with_lock_exit_code() {
    let temp = TempDir::new().unwrap();
    assert!(stm(temp.path(), &["init"]).status.success());
    fs::write(
        temp.path().join(".stm/config.yaml"),
        "lock_timeout_ms: 200\nlock_retry_interval_ms: 20\n",
    )
    .unwrap();

    // A live local holder: this test process.
    let marker = serde_json::json!({
        "pid": std::process::id(),
        "command": "test holder",
        "timestamp": chrono::Utc::now().timestamp_millis(),
    });
    fs::write(temp.path().join(".stm/lock"), marker.to_string()).unwrap();

    let output = stm(temp.path(), &["add", "Blocked"]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("test holder"), "stderr: {}", stderr);
    assert!(stderr.contains("stm lock clear --force"));
    assert!(task_ids(temp.path()).is_empty());

    assert!(
        stm(temp.path(), &["lock", "clear", "--force"])
            .status
            .success()
    );
    assert!(stm(temp.path(), &["add", "Unblocked"]).status.success());
    assert_eq!(task_ids(temp.path()), BTreeSet::from([1]));
}
