//! Persistence boundary for tasks.
//!
//! # Responsibility
//! - Define the typed store contract the task list depends on.
//! - Keep SQL details out of the list controller.

pub mod task_repo;
