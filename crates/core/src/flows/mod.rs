//! Interactive configuration flows: project init, adding channels and
//! adding packages. Each flow ends by running one `pixi` command through
//! the host's terminal and returns that command; `None` means the user
//! cancelled or a notification already explained why nothing ran.

mod channels;
mod init;
mod packages;

pub use channels::{add_channels, choose_channels};
pub use init::{InitFlow, choose_platforms, choose_project_type, init_command, project_type_pick};
pub use packages::{add_packages, add_pypi_packages};

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    config::Config,
    discovery::find_project_file,
    host::{Host, Level, QuickPick, QuickPickItem},
    project::Project,
    registry::Registry,
    tool::{PixiTool, ShellCommand},
};

/// What every flow needs from the session
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub host: &'a dyn Host,
    pub registry: &'a dyn Registry,
    pub tool: &'a dyn PixiTool,
    pub config: &'a Config,
    pub folders: &'a [PathBuf],
}

impl<'a> FlowContext<'a> {
    pub fn pixi(&self) -> ShellCommand {
        ShellCommand::new(self.config.executable())
    }

    async fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.host.notify(Level::Error, message).await;
    }

    /// The only folder, or the one the user picks among several
    pub async fn choose_workspace_folder(&self) -> Option<PathBuf> {
        match self.folders {
            [] => None,
            [only] => Some(only.clone()),
            folders => {
                let items = folders
                    .iter()
                    .map(|folder| QuickPickItem::new(folder.display().to_string()))
                    .collect();
                let picked = self
                    .host
                    .quick_pick(QuickPick::new("Select Workspace Folder", items))
                    .await?;
                picked.into_iter().next().map(PathBuf::from)
            }
        }
    }

    /// Manifest of `target`, or of a chosen workspace folder. Reports an
    /// error when there is no folder or no manifest in it.
    pub async fn resolve_manifest(&self, target: Option<&Path>) -> Option<PathBuf> {
        let dir = match target {
            Some(dir) => dir.to_path_buf(),
            None if self.folders.is_empty() => {
                self.error("No workspace folders open").await;
                return None;
            }
            None => self.choose_workspace_folder().await?,
        };

        if dir.is_file() {
            return Some(dir);
        }
        match find_project_file(&dir) {
            Some(manifest) => {
                debug!("Using manifest {}", manifest.display());
                Some(manifest)
            }
            None => {
                self.error(&format!("No pixi manifest found in {}", dir.display()))
                    .await;
                None
            }
        }
    }

    /// Project data for a manifest, if `pixi info` recognises it
    async fn project(&self, manifest: &Path) -> Option<Project> {
        let info = self.tool.info(Some(manifest)).await?;
        Project::new(manifest.to_path_buf(), info, Vec::new())
    }

    async fn run(&self, command: ShellCommand) -> ShellCommand {
        debug!("Running {}", command.to_shell_command());
        self.host.run_in_terminal(command.clone()).await;
        command
    }
}
