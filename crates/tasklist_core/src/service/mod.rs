//! Use-case layer between presentation and the task store.

pub mod task_list;
