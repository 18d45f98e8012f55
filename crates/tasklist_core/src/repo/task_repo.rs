//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable create/rename/delete/fetch over the `tasks` table.
//! - Stage mutations and write them in one transaction on `commit`.
//!
//! # Invariants
//! - `commit` touches the database only when changes are staged.
//! - A failed commit writes nothing and leaves no staged changes behind.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::DbError;
use crate::model::task::{Task, TaskId};
use log::{debug, error, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT uuid, title FROM tasks ORDER BY created_at ASC, rowid ASC;";
const TASK_COLUMNS: [&str; 4] = ["uuid", "title", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a `commit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was staged; the database was not touched.
    NoChanges,
    /// Staged changes were written in one transaction.
    Committed { applied: usize },
}

/// Durable CRUD boundary the task list depends on.
///
/// Mutating calls stage their change and commit it before returning, so a
/// returned `Ok` means the change is on disk.
pub trait TaskStore {
    /// Returns every persisted task in storage order.
    ///
    /// Storage order is stable but carries no meaning; callers that care
    /// about display order keep their own.
    fn fetch_all(&self) -> RepoResult<Vec<Task>>;
    /// Persists a new task with the given title and returns it.
    fn create(&mut self, title: &str) -> RepoResult<Task>;
    /// Replaces `task.title` in place and persists the new title.
    ///
    /// The in-memory title stays replaced even when the commit fails.
    fn rename(&mut self, task: &mut Task, new_title: &str) -> RepoResult<()>;
    /// Removes the task from storage. Removing an absent task succeeds.
    fn delete(&mut self, task: &Task) -> RepoResult<()>;
    /// Whether staged changes are waiting for `commit`.
    fn has_changes(&self) -> bool;
    /// Writes staged changes, if any.
    fn commit(&mut self) -> RepoResult<CommitOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingChange {
    Insert(Task),
    UpdateTitle { id: TaskId, title: String },
    Delete(TaskId),
}

impl PendingChange {
    fn label(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::UpdateTitle { .. } => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// SQLite-backed task store over a migrated connection.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
    pending: Vec<PendingChange>,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Constructs a store after checking the `tasks` schema is present.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the
    ///   connection was not opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_schema(conn)?;
        Ok(Self {
            conn,
            pending: Vec::new(),
        })
    }

    fn stage(&mut self, change: PendingChange) {
        debug!(
            "event=task_stage module=repo op={} pending={}",
            change.label(),
            self.pending.len() + 1
        );
        self.pending.push(change);
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn fetch_all(&self) -> RepoResult<Vec<Task>> {
        let started_at = Instant::now();
        match query_all_tasks(self.conn) {
            Ok(tasks) => {
                debug!(
                    "event=task_fetch module=repo status=ok count={} duration_ms={}",
                    tasks.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(tasks)
            }
            Err(err) => {
                error!(
                    "event=task_fetch module=repo status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn create(&mut self, title: &str) -> RepoResult<Task> {
        let task = Task::new(title);
        self.stage(PendingChange::Insert(task.clone()));
        self.commit()?;
        Ok(task)
    }

    fn rename(&mut self, task: &mut Task, new_title: &str) -> RepoResult<()> {
        if task.title == new_title {
            return self.commit().map(|_| ());
        }

        task.title = new_title.to_string();
        self.stage(PendingChange::UpdateTitle {
            id: task.id(),
            title: task.title.clone(),
        });
        self.commit().map(|_| ())
    }

    fn delete(&mut self, task: &Task) -> RepoResult<()> {
        self.stage(PendingChange::Delete(task.id()));
        self.commit().map(|_| ())
    }

    fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    fn commit(&mut self) -> RepoResult<CommitOutcome> {
        if self.pending.is_empty() {
            return Ok(CommitOutcome::NoChanges);
        }

        let started_at = Instant::now();
        let changes = std::mem::take(&mut self.pending);
        match apply_changes(self.conn, &changes) {
            Ok(()) => {
                info!(
                    "event=task_commit module=repo status=ok applied={} duration_ms={}",
                    changes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(CommitOutcome::Committed {
                    applied: changes.len(),
                })
            }
            Err(err) => {
                error!(
                    "event=task_commit module=repo status=error discarded={} duration_ms={} error={err}",
                    changes.len(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

fn apply_changes(conn: &Connection, changes: &[PendingChange]) -> RepoResult<()> {
    // Dropping the transaction on an early return rolls everything back.
    let tx = conn.unchecked_transaction()?;
    for change in changes {
        match change {
            PendingChange::Insert(task) => {
                tx.execute(
                    "INSERT INTO tasks (uuid, title) VALUES (?1, ?2);",
                    params![task.id().to_string(), task.title.as_str()],
                )?;
            }
            PendingChange::UpdateTitle { id, title } => {
                let changed = tx.execute(
                    "UPDATE tasks
                     SET
                        title = ?2,
                        updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000)
                     WHERE uuid = ?1;",
                    params![id.to_string(), title.as_str()],
                )?;
                if changed == 0 {
                    return Err(RepoError::NotFound(*id));
                }
            }
            PendingChange::Delete(id) => {
                tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}

fn query_all_tasks(conn: &Connection) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(TASK_SELECT_SQL)?;
    let mut rows = stmt.query([])?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    Ok(tasks)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;
    Ok(Task::with_id(id, row.get::<_, String>("title")?))
}

fn ensure_task_schema(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'tasks'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable("tasks"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(tasks);")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    for column in TASK_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "tasks",
                column,
            });
        }
    }

    Ok(())
}
