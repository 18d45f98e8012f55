//! Task list controller.
//!
//! # Responsibility
//! - Keep a display-ordered cache of tasks in sync with a `TaskStore`.
//! - Report which rows a presentation layer has to redraw after each call.
//!
//! # Invariants
//! - Cache index `i` is display row `i`.
//! - `add` always appends, whatever order the store returns on `load`.
//! - The cache only shrinks after the store confirmed the delete.

use crate::model::task::Task;
use crate::repo::task_repo::{RepoResult, TaskStore};
use log::{info, warn};

/// Rows affected by a controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// The whole list was replaced.
    Reloaded,
    Inserted(usize),
    Updated(usize),
    Deleted(usize),
}

/// Intent to edit one row, produced by `select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditIntent {
    pub row: usize,
    /// Title to prefill the edit input with.
    pub current_title: String,
}

/// Adapter between a task store and a single list screen.
pub struct TaskListController<S: TaskStore> {
    store: S,
    tasks: Vec<Task>,
}

impl<S: TaskStore> TaskListController<S> {
    /// Creates a controller with an empty cache. Call `load` to populate it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            tasks: Vec::new(),
        }
    }

    /// Replaces the cache with everything the store holds.
    ///
    /// On failure the cache is left untouched and the error is returned, so
    /// callers can tell "nothing stored" from "could not read".
    pub fn load(&mut self) -> RepoResult<RowChange> {
        match self.store.fetch_all() {
            Ok(tasks) => {
                info!(
                    "event=task_list_load module=service status=ok count={}",
                    tasks.len()
                );
                self.tasks = tasks;
                Ok(RowChange::Reloaded)
            }
            Err(err) => {
                warn!(
                    "event=task_list_load module=service status=error kept={} error={err}",
                    self.tasks.len()
                );
                Err(err)
            }
        }
    }

    /// Creates a task and appends it as the last row.
    pub fn add(&mut self, title: &str) -> RepoResult<RowChange> {
        let task = self.store.create(title)?;
        self.tasks.push(task);
        Ok(RowChange::Inserted(self.tasks.len() - 1))
    }

    /// Renames the task shown at `index`.
    ///
    /// The cached task is mutated in place; if the commit fails the new
    /// title stays in the cache while storage keeps the old one.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds.
    pub fn edit(&mut self, index: usize, new_title: &str) -> RepoResult<RowChange> {
        self.store.rename(&mut self.tasks[index], new_title)?;
        Ok(RowChange::Updated(index))
    }

    /// Deletes the task shown at `index` and drops its row.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds.
    pub fn delete(&mut self, index: usize) -> RepoResult<RowChange> {
        self.store.delete(&self.tasks[index])?;
        self.tasks.remove(index);
        Ok(RowChange::Deleted(index))
    }

    /// Starts an edit flow for the row at `index` without changing data.
    ///
    /// # Panics
    /// Panics when `index` is out of bounds.
    pub fn select(&self, index: usize) -> EditIntent {
        EditIntent {
            row: index,
            current_title: self.tasks[index].title.clone(),
        }
    }

    /// Cached tasks in display order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task at display row `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Number of displayed rows.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list shows no rows.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Gives the injected store back, dropping the cache.
    pub fn into_store(self) -> S {
        self.store
    }
}
