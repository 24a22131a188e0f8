//! Adapter around the external `pixi` executable

pub mod command;
pub mod pixi;

pub use command::{ShellCommand, exec_with_timeout};
pub use pixi::{PixiCli, PixiTool, parse_info, parse_packages, parse_task_list, run_command};
