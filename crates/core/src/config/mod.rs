//! Configuration management for pixi-runner

mod settings;

pub use settings::{
    Config, CONFIG_FILE_NAMES, DEFAULT_COMMAND_TIMEOUT_MS, DEFAULT_SEARCH_DEPTH, EXECUTABLE_ENV,
};
