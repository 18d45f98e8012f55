//! Core of the task list: storage bootstrap, the task store, and the list
//! controller that keeps displayed rows in sync with storage.
//!
//! Typical wiring:
//!
//! ```no_run
//! use tasklist_core::db::open_db;
//! use tasklist_core::{SqliteTaskStore, TaskListController};
//!
//! let conn = open_db("tasks.sqlite3")?;
//! let store = SqliteTaskStore::try_new(&conn)?;
//! let mut list = TaskListController::new(store);
//! list.load()?;
//! list.add("Buy milk")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{DbError, DbResult};
pub use logging::{default_log_level, flush_logs, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId};
pub use repo::task_repo::{CommitOutcome, RepoError, RepoResult, SqliteTaskStore, TaskStore};
pub use service::task_list::{EditIntent, RowChange, TaskListController};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
