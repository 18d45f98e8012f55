//! Task domain model.
//!
//! # Invariants
//! - `id` is generated once and never reused for another task.
//! - `title` carries no length, uniqueness or emptiness constraint.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a persisted task.
pub type TaskId = Uuid;

/// The single record kind held by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    /// Display text shown for the row. Replaced wholesale on rename.
    pub title: String,
}

impl Task {
    /// Creates a task with a freshly generated id.
    ///
    /// The task is not persisted; use `TaskStore::create` for that.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Rebuilds a task with a known identity, e.g. when reading rows back.
    pub fn with_id(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}
