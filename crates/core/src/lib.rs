//! pixi-runner - discovery and task aggregation for pixi projects
//!
//! This crate provides functionality to:
//! - Locate `pixi.toml` / `pyproject.toml` manifests inside workspace folders
//! - Query the `pixi` executable for project, environment and task data
//! - Keep that data cached per manifest and refresh it on file changes
//! - Flatten tasks into runnable descriptors with group, detail and source
//! - Drive interactive init / add-channel / add-package flows through a host
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod flows;
pub mod host;
pub mod project;
pub mod registry;
pub mod tasks;
pub mod tool;
pub mod types;
pub mod utils;
pub mod views;
pub mod workspace;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use config::Config;
pub use discovery::ManifestLocator;
pub use host::Host;
pub use project::Project;
pub use registry::Registry;
pub use tasks::{PixiTask, TaskGroup};
pub use tool::{PixiCli, PixiTool, ShellCommand};
pub use workspace::{RefreshOutcome, WatchEvent, Workspace};
