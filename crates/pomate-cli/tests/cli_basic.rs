//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against a throwaway home directory.

mod common;

use std::fs;
use std::path::Path;

use common::{parse_json, run_cli, run_cli_failure, run_cli_success};
use serde_json::Value;
use tempfile::TempDir;

fn write_config(home: &Path, content: &str) {
    let dir = home.join(".config").join("pomate");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), content).unwrap();
}

fn created_id(stdout: &str) -> String {
    stdout
        .trim()
        .strip_prefix("Task created: ")
        .expect("unexpected task add output")
        .to_string()
}

#[test]
fn test_task_add_and_list() {
    let home = TempDir::new().unwrap();
    let out = run_cli_success(home.path(), &["task", "add", "  Write report  "]);
    let id = created_id(&out);

    let tasks: Vec<Value> = parse_json(&run_cli_success(home.path(), &["task", "list"]));
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], id.as_str());
    assert_eq!(tasks[0]["name"], "Write report");
    assert_eq!(tasks[0]["isCompleted"], false);
    assert_eq!(tasks[0]["associatedSessions"], 0);
}

#[test]
fn test_task_add_blank_name_fails() {
    let home = TempDir::new().unwrap();
    let stderr = run_cli_failure(home.path(), &["task", "add", "   "]);
    assert!(stderr.contains("must not be empty"));

    let tasks: Vec<Value> = parse_json(&run_cli_success(home.path(), &["task", "list"]));
    assert!(tasks.is_empty());
}

#[test]
fn test_task_toggle() {
    let home = TempDir::new().unwrap();
    let id = created_id(&run_cli_success(home.path(), &["task", "add", "Toggle me"]));

    assert_eq!(run_cli_success(home.path(), &["task", "toggle", &id]).trim(), "completed");
    let tasks: Vec<Value> = parse_json(&run_cli_success(home.path(), &["task", "list"]));
    assert_eq!(tasks[0]["isCompleted"], true);
    assert!(tasks[0]["completedAt"].is_string());

    assert_eq!(run_cli_success(home.path(), &["task", "toggle", &id]).trim(), "reopened");
    let tasks: Vec<Value> = parse_json(&run_cli_success(home.path(), &["task", "list"]));
    assert_eq!(tasks[0]["isCompleted"], false);
    assert!(tasks[0]["completedAt"].is_null());
}

#[test]
fn test_task_current_and_delete() {
    let home = TempDir::new().unwrap();
    let id = created_id(&run_cli_success(home.path(), &["task", "add", "Focus"]));

    assert_eq!(run_cli_success(home.path(), &["task", "current"]).trim(), "null");
    run_cli_success(home.path(), &["task", "current", &id]);
    let current: Value = parse_json(&run_cli_success(home.path(), &["task", "current"]));
    assert_eq!(current["id"], id.as_str());

    run_cli_success(home.path(), &["task", "delete", &id]);
    assert_eq!(run_cli_success(home.path(), &["task", "current"]).trim(), "null");
}

#[test]
fn test_task_unknown_id_fails() {
    let home = TempDir::new().unwrap();
    let missing = "00000000-0000-0000-0000-000000000000";
    run_cli_failure(home.path(), &["task", "toggle", missing]);
    run_cli_failure(home.path(), &["task", "delete", missing]);
    run_cli_failure(home.path(), &["task", "current", missing]);
}

#[test]
fn test_config_settings_roundtrip() {
    let home = TempDir::new().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "settings.work_duration"]).trim(),
        "1500"
    );

    run_cli_success(home.path(), &["config", "set", "settings.work_duration", "600"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "settings.work_duration"]).trim(),
        "600"
    );

    let status: Value = parse_json(&run_cli_success(home.path(), &["timer", "status"]));
    assert_eq!(status["type"], "state_snapshot");
    assert_eq!(status["remaining_secs"], 600);
    assert_eq!(status["formatted"], "10:00");
    assert_eq!(status["running"], false);
}

#[test]
fn test_config_rejects_invalid_values() {
    let home = TempDir::new().unwrap();
    run_cli_failure(home.path(), &["config", "set", "settings.work_duration", "0"]);
    run_cli_failure(home.path(), &["config", "set", "settings.sessions_before_long_break", "0"]);
    run_cli_failure(home.path(), &["config", "set", "settings.play_sound", "maybe"]);
    run_cli_failure(home.path(), &["config", "get", "settings.nope"]);
    run_cli_failure(home.path(), &["config", "get", "nope"]);
}

#[test]
fn test_config_file_values() {
    let home = TempDir::new().unwrap();
    run_cli_success(home.path(), &["config", "set", "log_filter", "debug"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "log_filter"]).trim(),
        "debug"
    );

    run_cli_success(home.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "log_filter"]).trim(),
        "warn"
    );

    let list: Value = parse_json(&run_cli_success(home.path(), &["config", "list"]));
    assert_eq!(list["settings"]["sessions_before_long_break"], 4);
    assert_eq!(list["settings"]["play_sound"], true);
}

#[test]
fn test_empty_history_and_stats() {
    let home = TempDir::new().unwrap();
    let history: Vec<Value> = parse_json(&run_cli_success(home.path(), &["history"]));
    assert!(history.is_empty());

    let today: Value = parse_json(&run_cli_success(home.path(), &["stats", "today"]));
    assert_eq!(today["work_sessions"], 0);
    assert_eq!(today["focus"], "0m");

    let week: Vec<Value> = parse_json(&run_cli_success(home.path(), &["stats", "week"]));
    assert_eq!(week.len(), 7);
}

#[test]
fn test_timer_run_one_cycle() {
    let home = TempDir::new().unwrap();
    run_cli_success(home.path(), &["config", "set", "settings.work_duration", "1"]);
    run_cli_success(home.path(), &["config", "set", "settings.play_sound", "false"]);
    let id = created_id(&run_cli_success(home.path(), &["task", "add", "Timed"]));
    run_cli_success(home.path(), &["task", "current", &id]);

    let out = run_cli_success(home.path(), &["timer", "run", "--cycles", "1", "--quiet"]);
    let events: Vec<Value> = out.lines().map(parse_json).collect();
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(
        kinds,
        ["session_started", "session_completed", "session_started", "timer_paused"]
    );
    assert_eq!(events[2]["state"], "shortBreak");
    assert_eq!(events[1]["record"]["type"], "work");
    assert_eq!(events[1]["record"]["duration"], 1);

    let history: Vec<Value> = parse_json(&run_cli_success(home.path(), &["history", "--limit", "5"]));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["completed"], true);

    let tasks: Vec<Value> = parse_json(&run_cli_success(home.path(), &["task", "list"]));
    assert_eq!(tasks[0]["associatedSessions"], 1);

    let all: Value = parse_json(&run_cli_success(home.path(), &["stats", "all"]));
    assert_eq!(all["work_sessions"], 1);
    assert_eq!(all["focus_secs"], 1);
}

#[test]
fn test_corrupt_config_warns_and_uses_defaults() {
    let home = TempDir::new().unwrap();
    write_config(home.path(), "log_filter = [unterminated");

    let (stdout, stderr, code) = run_cli(home.path(), &["config", "get", "log_filter"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(stdout.trim(), "warn");
    assert!(stderr.contains("falling back to default configuration"));
}

#[test]
fn test_unopenable_database_reports_store_error() {
    let home = TempDir::new().unwrap();
    let db = home.path().join("missing").join("dir").join("pomate.db");
    write_config(
        home.path(),
        &format!("database_path = {:?}\n", db.to_string_lossy()),
    );

    let stderr = run_cli_failure(home.path(), &["task", "list"]);
    assert!(stderr.contains("Store error"), "stderr: {stderr}");
}
