use crate::{
    error::{Error, Result},
    types::{Platform, ProjectType},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_SEARCH_DEPTH: usize = 3;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 5000;

/// Environment variable overriding `executable_path`
pub const EXECUTABLE_ENV: &str = "PIXI_RUNNER_EXECUTABLE";

/// Looked up in this order in every directory from the cwd upwards
pub const CONFIG_FILE_NAMES: [&str; 2] = [".pixi-runner.json", "pixi-runner.json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// The pixi executable, resolved through PATH when not absolute
    pub executable_path: String,

    /// How many directory levels below a workspace folder are searched.
    /// Kept signed so an invalid value in the file can be reported instead of
    /// failing the whole load.
    pub search_depth: i64,

    /// Glob patterns, relative to a workspace folder, excluded from discovery
    pub ignore: Vec<String>,

    /// Honour the workspace folder's `.gitignore` during discovery
    pub gitignore: bool,

    pub default_project_type: ProjectType,
    pub default_channels: Vec<String>,
    pub default_platforms: Vec<Platform>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_api_key: Option<String>,

    pub command_timeout_ms: u64,

    /// Where picker selections are persisted between runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            executable_path: "pixi".to_string(),
            search_depth: DEFAULT_SEARCH_DEPTH as i64,
            ignore: Vec::new(),
            gitignore: false,
            default_project_type: ProjectType::Pixi,
            default_channels: Vec::new(),
            default_platforms: Vec::new(),
            prefix_api_key: None,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            cache_dir: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config file above `start_path`, falling back to
    /// defaults, then apply environment overrides.
    pub fn discover(start_path: &Path) -> Result<Self> {
        let mut config = match Self::find_config_file(start_path) {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(executable) = std::env::var(EXECUTABLE_ENV) {
            if !executable.trim().is_empty() {
                config.executable_path = executable;
            }
        }

        Ok(config)
    }

    /// Search depth to use, replacing non-positive values with the default
    pub fn effective_search_depth(&self) -> usize {
        if self.search_depth > 0 {
            self.search_depth as usize
        } else {
            warn!(
                "Invalid search depth: {}, using default of {}",
                self.search_depth, DEFAULT_SEARCH_DEPTH
            );
            DEFAULT_SEARCH_DEPTH
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Executable to invoke, with an empty setting meaning plain `pixi`
    pub fn executable(&self) -> &str {
        if self.executable_path.trim().is_empty() {
            "pixi"
        } else {
            &self.executable_path
        }
    }

    /// Cache directory for persisted selections, defaulting under the user
    /// cache dir
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("pixi-runner")))
    }
}
