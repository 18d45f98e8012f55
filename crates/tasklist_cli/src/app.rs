//! Argument model and command dispatch.
//!
//! Rows are numbered from 1 on the command line and mapped to controller
//! indices here; the controller itself never sees an invalid index.

use crate::config::Settings;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use tasklist_core::db::open_db;
use tasklist_core::{
    init_logging, DbError, RepoError, SqliteTaskStore, TaskListController, TaskStore,
};

#[derive(Parser, Debug)]
#[command(name = "tasklist", version, about = "Keep a simple list of tasks")]
pub struct Cli {
    /// Path of the task database file
    #[arg(long, global = true, env = "TASKLIST_DB_PATH")]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true, env = "TASKLIST_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = "TASKLIST_LOG_LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print all tasks
    List {
        /// Emit a JSON array instead of numbered lines
        #[arg(long)]
        json: bool,
    },
    /// Append a new task
    Add {
        /// Task title
        title: String,
    },
    /// Change the title of a task
    Rename {
        /// Row number as printed by `list`
        row: usize,
        /// New title
        title: String,
    },
    /// Delete a task
    Delete {
        /// Row number as printed by `list`
        row: usize,
    },
    /// Print the current title of one task
    Show {
        /// Row number as printed by `list`
        row: usize,
    },
}

impl Command {
    /// Stable name for log events; titles never go into logs.
    fn label(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Add { .. } => "add",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
            Self::Show { .. } => "show",
        }
    }

    fn row(&self) -> Option<usize> {
        match self {
            Self::Rename { row, .. } | Self::Delete { row } | Self::Show { row } => Some(*row),
            Self::List { .. } | Self::Add { .. } => None,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    /// The database could not be opened or migrated.
    Open(DbError),
    Repo(RepoError),
    Io(std::io::Error),
    Json(serde_json::Error),
    RowOutOfRange(usize),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open task database: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "failed to encode tasks: {err}"),
            Self::RowOutOfRange(row) => write!(f, "row {row} does not exist"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::RowOutOfRange(_) => None,
        }
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Runs one CLI invocation against the configured database.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::resolve(cli.db, cli.log_dir, cli.log_level);

    if let Some(log_dir) = settings.log_dir.as_deref() {
        // Logging is best effort; a bad log setup must not block the list.
        if let Err(err) = init_logging(&settings.log_level, &log_dir.to_string_lossy()) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    settings.ensure_db_parent()?;
    let conn = open_db(&settings.db_path).map_err(CliError::Open)?;
    let store = SqliteTaskStore::try_new(&conn)?;
    let mut list = TaskListController::new(store);
    list.load()?;
    match cli.command.row() {
        Some(row) => info!(
            "event=cli_command module=cli status=start command={} row={row} rows={}",
            cli.command.label(),
            list.len()
        ),
        None => info!(
            "event=cli_command module=cli status=start command={} rows={}",
            cli.command.label(),
            list.len()
        ),
    }

    let mut out = std::io::stdout().lock();
    execute(&mut list, cli.command, &mut out)
}

fn execute<S: TaskStore>(
    list: &mut TaskListController<S>,
    command: Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::List { json } => {
            if json {
                serde_json::to_writer(&mut *out, list.tasks())?;
                writeln!(out)?;
            } else if list.is_empty() {
                writeln!(out, "No tasks.")?;
            } else {
                for (index, task) in list.tasks().iter().enumerate() {
                    writeln!(out, "{}. {task}", index + 1)?;
                }
            }
        }
        Command::Add { title } => {
            if title.is_empty() {
                warn!("event=cli_add module=cli status=skipped reason=empty_title");
                writeln!(out, "Nothing to add: title is empty.")?;
                return Ok(());
            }
            list.add(&title)?;
            writeln!(out, "Added task {}: {title}", list.len())?;
        }
        Command::Rename { row, title } => {
            let index = row_index(list, row)?;
            if title.is_empty() {
                writeln!(out, "Nothing to change: title is empty.")?;
                return Ok(());
            }
            let intent = list.select(index);
            list.edit(index, &title)?;
            writeln!(out, "Renamed task {row}: {} -> {title}", intent.current_title)?;
        }
        Command::Delete { row } => {
            let index = row_index(list, row)?;
            let title = list.select(index).current_title;
            list.delete(index)?;
            writeln!(out, "Deleted task {row}: {title}")?;
        }
        Command::Show { row } => {
            let index = row_index(list, row)?;
            writeln!(out, "{}", list.select(index).current_title)?;
        }
    }
    Ok(())
}

fn row_index<S: TaskStore>(list: &TaskListController<S>, row: usize) -> Result<usize, CliError> {
    row.checked_sub(1)
        .filter(|index| list.get(*index).is_some())
        .ok_or(CliError::RowOutOfRange(row))
}

#[cfg(test)]
mod tests {
    use super::{execute, Command};
    use tasklist_core::db::open_db_in_memory;
    use tasklist_core::{SqliteTaskStore, TaskListController};

    fn run_command(
        list: &mut TaskListController<SqliteTaskStore<'_>>,
        command: Command,
    ) -> String {
        let mut out = Vec::new();
        execute(list, command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_title_is_ignored_but_whitespace_is_kept() {
        let conn = open_db_in_memory().unwrap();
        let mut list = TaskListController::new(SqliteTaskStore::try_new(&conn).unwrap());

        let output = run_command(
            &mut list,
            Command::Add {
                title: String::new(),
            },
        );
        assert!(output.contains("Nothing to add"));
        assert!(list.is_empty());

        run_command(
            &mut list,
            Command::Add {
                title: "   ".to_string(),
            },
        );
        assert_eq!(list.len(), 1);

        let output = run_command(
            &mut list,
            Command::Rename {
                row: 1,
                title: String::new(),
            },
        );
        assert!(output.contains("Nothing to change"));
        assert_eq!(list.tasks()[0].title, "   ");
    }

    #[test]
    fn log_labels_carry_no_titles() {
        let add = Command::Add {
            title: "private".to_string(),
        };
        assert_eq!(add.label(), "add");
        assert_eq!(add.row(), None);

        let rename = Command::Rename {
            row: 2,
            title: "private".to_string(),
        };
        assert_eq!(rename.label(), "rename");
        assert_eq!(rename.row(), Some(2));
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let conn = open_db_in_memory().unwrap();
        let mut list = TaskListController::new(SqliteTaskStore::try_new(&conn).unwrap());
        list.add("first").unwrap();
        list.add("second").unwrap();

        let output = run_command(&mut list, Command::List { json: false });
        assert_eq!(output, "1. first\n2. second\n");
    }

    #[test]
    fn row_zero_and_past_end_are_rejected() {
        let conn = open_db_in_memory().unwrap();
        let mut list = TaskListController::new(SqliteTaskStore::try_new(&conn).unwrap());
        list.add("only").unwrap();

        for row in [0, 2] {
            let mut out = Vec::new();
            let err = execute(&mut list, Command::Delete { row }, &mut out).unwrap_err();
            assert_eq!(err.to_string(), format!("row {row} does not exist"));
        }
        assert_eq!(list.len(), 1);
    }
}
