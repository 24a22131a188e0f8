use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Platform;

/// Output of `pixi info --json`
///
/// `project_info` is absent when the queried path is not a pixi project,
/// which is how manifests are validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixiInfo {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub virtual_packages: Vec<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub auth_dir: Option<PathBuf>,
    #[serde(default)]
    pub global_info: Option<GlobalInfo>,
    #[serde(default)]
    pub project_info: Option<ProjectInfo>,
    #[serde(default)]
    pub environments_info: Vec<EnvironmentInfo>,
    #[serde(default)]
    pub config_locations: Vec<PathBuf>,
}

impl PixiInfo {
    /// The platform pixi resolved for this machine, if it is one we know
    pub fn platform(&self) -> Option<Platform> {
        self.platform.parse().ok()
    }

    pub fn is_project(&self) -> bool {
        self.project_info.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInfo {
    #[serde(default)]
    pub bin_dir: PathBuf,
    #[serde(default)]
    pub env_dir: PathBuf,
    #[serde(default)]
    pub manifest: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub manifest_path: PathBuf,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub name: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub solve_group: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub pypi_dependencies: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub prefix: PathBuf,
}
