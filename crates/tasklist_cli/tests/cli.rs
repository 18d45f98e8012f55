use assert_cmd::Command;
use predicates::str::contains;
use std::path::Path;

fn tasklist(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tasklist").unwrap();
    cmd.env_remove("TASKLIST_LOG_DIR")
        .env_remove("TASKLIST_LOG_LEVEL")
        .arg("--db")
        .arg(db);
    cmd
}

#[test]
fn add_rename_delete_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("nested").join("tasks.sqlite3");

    tasklist(&db).arg("list").assert().success().stdout("No tasks.\n");

    tasklist(&db)
        .args(["add", "Buy milk"])
        .assert()
        .success()
        .stdout(contains("Added task 1: Buy milk"));
    tasklist(&db).args(["add", "Call mom"]).assert().success();

    tasklist(&db)
        .args(["rename", "1", "Buy milk and bread"])
        .assert()
        .success()
        .stdout(contains("Buy milk -> Buy milk and bread"));

    tasklist(&db)
        .arg("list")
        .assert()
        .success()
        .stdout("1. Buy milk and bread\n2. Call mom\n");

    tasklist(&db)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(contains("Deleted task 1: Buy milk and bread"));

    tasklist(&db)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout("Call mom\n");
}

#[test]
fn list_json_includes_ids_and_titles() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.sqlite3");
    tasklist(&db).args(["add", "write report"]).assert().success();

    let output = tasklist(&db).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "write report");
    assert!(items[0]["id"].as_str().is_some());
}

#[test]
fn missing_row_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.sqlite3");

    tasklist(&db)
        .args(["delete", "3"])
        .assert()
        .failure()
        .stderr(contains("row 3 does not exist"));
}

#[test]
fn newer_schema_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("future.sqlite3");
    stamp_future_schema(&db).unwrap();

    tasklist(&db)
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("failed to open task database"));
}

#[test]
fn writes_log_file_without_task_titles() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.sqlite3");
    let logs = dir.path().join("logs");

    tasklist(&db)
        .arg("--log-dir")
        .arg(&logs)
        .args(["--log-level", "info", "add", "SECRET-TITLE"])
        .assert()
        .success();

    let contents: Vec<String> = std::fs::read_dir(&logs)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("tasklist"))
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap())
        .collect();
    assert!(!contents.is_empty());
    let all = contents.concat();
    assert!(all.contains("event=cli_command"));
    assert!(all.contains("command=add"));
    assert!(!all.contains("SECRET-TITLE"));
}

#[test]
fn whitespace_title_is_kept_and_empty_title_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tasks.sqlite3");

    tasklist(&db)
        .args(["add", ""])
        .assert()
        .success()
        .stdout(contains("Nothing to add"));
    tasklist(&db)
        .args(["add", "   "])
        .assert()
        .success()
        .stdout(contains("Added task 1"));

    let output = tasklist(&db).args(["list", "--json"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "   ");
}

fn stamp_future_schema(path: &Path) -> tasklist_core::DbResult<()> {
    let conn = tasklist_core::db::open_db(path)?;
    conn.execute_batch("PRAGMA user_version = 999;")
        .map_err(tasklist_core::DbError::from)?;
    Ok(())
}
