use std::io;
use std::time::Duration;

/// Errors that can occur during pixi-runner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Command `{command}` timed out after {}ms", .timeout.as_millis())]
    Timeout { command: String, timeout: Duration },

    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Ignore pattern error: {0}")]
    PatternError(String),

    #[error("Registry request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for pixi-runner operations
pub type Result<T> = std::result::Result<T, Error>;
