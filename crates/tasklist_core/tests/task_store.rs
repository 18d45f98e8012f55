use rusqlite::Connection;
use tasklist_core::db::open_db_in_memory;
use tasklist_core::{CommitOutcome, RepoError, SqliteTaskStore, Task, TaskStore};

#[test]
fn create_is_visible_exactly_once() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();

    for title in ["Buy milk", "", "   "] {
        let created = store.create(title).unwrap();
        assert_eq!(created.title, title);

        let all = store.fetch_all().unwrap();
        let matching = all.iter().filter(|task| task.id() == created.id()).count();
        assert_eq!(matching, 1);
    }
    assert_eq!(store.fetch_all().unwrap().len(), 3);
}

#[test]
fn rename_updates_in_place_without_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();

    let mut task = store.create("draft").unwrap();
    store.rename(&mut task, "final").unwrap();
    assert_eq!(task.title, "final");

    let all = store.fetch_all().unwrap();
    assert_eq!(all, vec![task]);
}

#[test]
fn rename_to_same_title_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();

    let mut task = store.create("same").unwrap();
    conn.execute("UPDATE tasks SET updated_at = 1;", []).unwrap();
    store.rename(&mut task, "same").unwrap();

    let updated_at: i64 = conn
        .query_row("SELECT updated_at FROM tasks;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(updated_at, 1);
}

#[test]
fn delete_removes_identity_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();

    let keep = store.create("keep").unwrap();
    let gone = store.create("gone").unwrap();
    store.delete(&gone).unwrap();
    store.delete(&gone).unwrap();

    let all = store.fetch_all().unwrap();
    assert_eq!(all, vec![keep]);
}

#[test]
fn commit_without_changes_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();

    assert!(!store.has_changes());
    assert_eq!(store.commit().unwrap(), CommitOutcome::NoChanges);
    store.create("one").unwrap();
    assert_eq!(store.commit().unwrap(), CommitOutcome::NoChanges);
}

#[test]
fn rename_of_deleted_task_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();

    let mut task = store.create("short lived").unwrap();
    let copy = task.clone();
    store.delete(&copy).unwrap();

    let err = store.rename(&mut task, "renamed").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == copy.id()));
    assert_eq!(task.title, "renamed");
    assert!(!store.has_changes());
}

#[test]
fn commit_failure_is_returned_and_discards_staged_change() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteTaskStore::try_new(&conn).unwrap();
    store.create("before").unwrap();

    conn.execute_batch("DROP TABLE tasks;").unwrap();

    let err = store.create("after").unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert!(!store.has_changes());
    assert!(store.fetch_all().is_err());
}

#[test]
fn fetch_rejects_malformed_ids() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO tasks (uuid, title) VALUES ('not-a-uuid', 'broken');",
        [],
    )
    .unwrap();
    let store = SqliteTaskStore::try_new(&conn).unwrap();

    let err = store.fetch_all().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("not-a-uuid")));
}

#[test]
fn try_new_requires_migrated_schema() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteTaskStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("tasks")));

    conn.execute_batch("CREATE TABLE tasks (uuid TEXT PRIMARY KEY, title TEXT);")
        .unwrap();
    let err = SqliteTaskStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "tasks",
            column: "created_at"
        }
    ));
}

#[test]
fn tasks_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.sqlite3");

    let created: Task = {
        let conn = tasklist_core::db::open_db(&path).unwrap();
        let mut store = SqliteTaskStore::try_new(&conn).unwrap();
        store.create("persisted").unwrap()
    };

    let conn = tasklist_core::db::open_db(&path).unwrap();
    let store = SqliteTaskStore::try_new(&conn).unwrap();
    assert_eq!(store.fetch_all().unwrap(), vec![created]);
}
