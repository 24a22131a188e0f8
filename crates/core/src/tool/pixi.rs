use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use super::command::{ShellCommand, exec_with_timeout};
use crate::{
    config::Config,
    types::{EnvFeatureTaskList, PackageInfo, PixiInfo},
};

/// Queries against the pixi executable.
///
/// Every method fails closed: a failed invocation or unexpected output is
/// logged and reported as "no data".
#[async_trait]
pub trait PixiTool: Send + Sync {
    /// `pixi info`, scoped to a manifest when one is given
    async fn info(&self, manifest: Option<&Path>) -> Option<PixiInfo>;

    /// `pixi task list` for a manifest
    async fn task_list(&self, manifest: &Path) -> Vec<EnvFeatureTaskList>;

    /// `pixi list` for one environment of a manifest
    async fn list_packages(
        &self,
        manifest: &Path,
        environment: &str,
        explicit: bool,
    ) -> Vec<PackageInfo>;
}

/// [`PixiTool`] backed by the real executable
#[derive(Debug, Clone)]
pub struct PixiCli {
    executable: String,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl PixiCli {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
            working_dir: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.executable(), config.command_timeout())
    }

    /// Directory used for queries that are not tied to a manifest
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn command(&self) -> ShellCommand {
        let cmd = ShellCommand::new(&self.executable);
        match self.working_dir {
            Some(ref dir) => cmd.with_working_dir(dir),
            None => cmd,
        }
    }

    pub fn info_command(&self, manifest: Option<&Path>) -> ShellCommand {
        let cmd = self.command().args(["info", "--json"]);
        match manifest {
            Some(path) => cmd.arg("--manifest-path").arg(path.display().to_string()),
            None => cmd,
        }
    }

    pub fn task_list_command(&self, manifest: &Path) -> ShellCommand {
        self.command()
            .args(["task", "list", "--json", "--manifest-path"])
            .arg(manifest.display().to_string())
    }

    pub fn list_command(&self, manifest: &Path, environment: &str, explicit: bool) -> ShellCommand {
        let mut cmd = self.command().arg("list");
        if explicit {
            cmd = cmd.arg("--explicit");
        }
        cmd.args(["--environment", environment, "--json", "--manifest-path"])
            .arg(manifest.display().to_string())
    }

    async fn query(&self, cmd: ShellCommand) -> Option<String> {
        match exec_with_timeout(&cmd, self.timeout).await {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("pixi query failed: {}", e);
                None
            }
        }
    }
}

/// `pixi run` invocation for one task of one environment
pub fn run_command(executable: &str, manifest: &Path, environment: &str, task: &str) -> ShellCommand {
    ShellCommand::new(executable)
        .arg("run")
        .arg("--manifest-path")
        .arg(manifest.display().to_string())
        .args(["--environment", environment, task])
}

#[async_trait]
impl PixiTool for PixiCli {
    async fn info(&self, manifest: Option<&Path>) -> Option<PixiInfo> {
        let output = self.query(self.info_command(manifest)).await?;
        parse_info(&output)
    }

    async fn task_list(&self, manifest: &Path) -> Vec<EnvFeatureTaskList> {
        match self.query(self.task_list_command(manifest)).await {
            Some(output) => parse_task_list(&output),
            None => Vec::new(),
        }
    }

    async fn list_packages(
        &self,
        manifest: &Path,
        environment: &str,
        explicit: bool,
    ) -> Vec<PackageInfo> {
        match self
            .query(self.list_command(manifest, environment, explicit))
            .await
        {
            Some(output) => parse_packages(&output),
            None => Vec::new(),
        }
    }
}

fn parse_json<T: DeserializeOwned>(output: &str, what: &str) -> Option<T> {
    match serde_json::from_str(output.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Failed to parse {}: {}", what, e);
            None
        }
    }
}

pub fn parse_info(output: &str) -> Option<PixiInfo> {
    parse_json(output, "pixi info output")
}

/// `pixi task list` prints plain text when there is nothing to list, which
/// lands here as an empty list like any other unparseable output.
pub fn parse_task_list(output: &str) -> Vec<EnvFeatureTaskList> {
    parse_json(output, "pixi task list output").unwrap_or_default()
}

pub fn parse_packages(output: &str) -> Vec<PackageInfo> {
    parse_json(output, "pixi list output").unwrap_or_default()
}
