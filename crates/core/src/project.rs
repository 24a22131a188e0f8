//! A validated pixi project and the data fetched for it

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::types::{EnvFeatureTaskList, EnvironmentInfo, PixiInfo};

/// A manifest that `pixi info` recognised as a project, with its task list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub manifest_path: PathBuf,
    pub info: PixiInfo,
    pub tasks: Vec<EnvFeatureTaskList>,
    /// md5 of the manifest contents when the data was fetched
    #[serde(skip)]
    pub manifest_hash: Option<String>,
}

impl Project {
    /// Returns `None` unless `info` carries project information
    pub fn new(manifest_path: PathBuf, info: PixiInfo, tasks: Vec<EnvFeatureTaskList>) -> Option<Self> {
        let manifest_hash = hash_manifest(&manifest_path);
        Self::with_hash(manifest_path, info, tasks, manifest_hash)
    }

    /// Like [`Project::new`], recording `manifest_hash` as the contents the
    /// data was fetched from. Hash before querying `pixi` so an edit made
    /// during the fetch still reads as a change.
    pub fn with_hash(
        manifest_path: PathBuf,
        info: PixiInfo,
        tasks: Vec<EnvFeatureTaskList>,
        manifest_hash: Option<String>,
    ) -> Option<Self> {
        if !info.is_project() {
            return None;
        }
        Some(Self {
            manifest_path,
            info,
            tasks,
            manifest_hash,
        })
    }

    pub fn name(&self) -> &str {
        self.info
            .project_info
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or_default()
    }

    pub fn version(&self) -> Option<&str> {
        self.info.project_info.as_ref()?.version.as_deref()
    }

    /// Directory holding the manifest
    pub fn root(&self) -> &Path {
        self.manifest_path.parent().unwrap_or(Path::new("."))
    }

    pub fn environments(&self) -> &[EnvironmentInfo] {
        &self.info.environments_info
    }

    pub fn environment(&self, name: &str) -> Option<&EnvironmentInfo> {
        self.environments().iter().find(|env| env.name == name)
    }

    pub fn environment_names(&self) -> Vec<String> {
        self.environments().iter().map(|env| env.name.clone()).collect()
    }

    pub fn environment_prefixes(&self) -> Vec<PathBuf> {
        self.environments().iter().map(|env| env.prefix.clone()).collect()
    }

    /// Feature names across all environments, first occurrence wins
    pub fn features(&self) -> Vec<String> {
        dedup(self.environments().iter().flat_map(|env| env.features.iter()))
    }

    /// Channel references across all environments, first occurrence wins
    pub fn channels(&self) -> Vec<String> {
        dedup(self.environments().iter().flat_map(|env| env.channels.iter()))
    }

    pub fn task_count(&self) -> usize {
        self.tasks
            .iter()
            .flat_map(|env| env.features.iter())
            .map(|feature| feature.tasks.len())
            .sum()
    }

    /// Whether the manifest on disk still has the contents the data was
    /// fetched from
    pub fn is_current(&self) -> bool {
        self.manifest_hash.is_some() && self.manifest_hash == hash_manifest(&self.manifest_path)
    }
}

/// Interpreter inside an environment prefix
pub fn python_interpreter_path(env: &EnvironmentInfo) -> PathBuf {
    if cfg!(windows) {
        env.prefix.join("python.exe")
    } else {
        env.prefix.join("bin").join("python")
    }
}

pub(crate) fn hash_manifest(path: &Path) -> Option<String> {
    let contents = std::fs::read(path).ok()?;
    Some(format!("{:x}", md5::compute(contents)))
}

fn dedup<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}
