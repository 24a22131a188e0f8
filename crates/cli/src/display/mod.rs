pub mod formatter;

pub use formatter::{ProjectSummary, format_environment, format_project, format_task, task_rows};
