//! Runtime settings for the CLI.
//!
//! Precedence: command-line flag, then `TASKLIST_*` environment variable
//! (both handled by clap), then the defaults below.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "tasklist";
const DB_FILE_NAME: &str = "tasklist.sqlite3";

/// Resolved settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Self {
        Self {
            db_path: db_path.unwrap_or_else(default_db_path),
            log_dir,
            log_level: log_level
                .unwrap_or_else(|| tasklist_core::default_log_level().to_string()),
        }
    }

    /// Creates the directory holding the database file if needed.
    pub fn ensure_db_parent(&self) -> std::io::Result<()> {
        match self.db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

fn default_db_path() -> PathBuf {
    default_db_path_in(dirs::data_dir().as_deref())
}

fn default_db_path_in(data_dir: Option<&Path>) -> PathBuf {
    match data_dir {
        Some(dir) => dir.join(APP_DIR_NAME).join(DB_FILE_NAME),
        None => std::env::temp_dir().join(DB_FILE_NAME),
    }
}
