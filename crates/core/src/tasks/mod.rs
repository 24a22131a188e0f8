//! Flattening project task lists into runnable task descriptors

pub mod classify;
pub mod definition;

pub use classify::{TaskGroup, classify};
pub use definition::{PixiTask, TASK_TYPE, TaskDefinition, flatten, flatten_all};
