pub mod channels;
pub mod config;
pub mod discover;
pub mod envs;
pub mod init;
pub mod packages;
pub mod run;
pub mod tasks;
pub mod watch;

pub use channels::add_channel_command;
pub use config::config_command;
pub use discover::discover_command;
pub use envs::envs_command;
pub use init::init_command;
pub use packages::add_package_command;
pub use run::run_command;
pub use tasks::tasks_command;
pub use watch::watch_command;

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use pixi_runner_core::{
    Config, Host, PixiCli, Registry, Workspace,
    cache::SelectionCache,
    discovery::find_project_file,
    flows::FlowContext,
    registry::PrefixClient,
};

/// Everything a command needs before it touches pixi
pub struct Session {
    pub cwd: PathBuf,
    pub config: Config,
    pub folders: Vec<PathBuf>,
    pub pixi: Arc<PixiCli>,
}

impl Session {
    /// Resolve configuration from the current directory. Without explicit
    /// folders the current directory is the only workspace folder.
    pub fn load(folders: Vec<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let config = Config::discover(&cwd).context("Failed to load configuration")?;

        let folders: Vec<PathBuf> = if folders.is_empty() {
            vec![cwd.clone()]
        } else {
            folders.iter().map(|folder| cwd.join(folder)).collect()
        };
        for folder in &folders {
            if !folder.is_dir() {
                bail!("Workspace folder not found: {}", folder.display());
            }
        }

        let pixi = Arc::new(PixiCli::from_config(&config));
        Ok(Self {
            cwd,
            config,
            folders,
            pixi,
        })
    }

    /// A workspace over the session's folders with discovery already run
    pub async fn workspace(&self) -> Result<Workspace> {
        let workspace = Workspace::new(self.folders.clone(), self.config.clone(), self.pixi.clone())?;
        let count = workspace.discover().await;
        debug!("Discovered {} projects", count);
        Ok(workspace)
    }

    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    /// `path` itself when it is a file, else the manifest inside it
    pub fn manifest(&self, path: &Path) -> Result<PathBuf> {
        let path = self.absolute(path);
        if path.is_file() {
            return Ok(path);
        }
        find_project_file(&path).with_context(|| format!("No pixi manifest found in {}", path.display()))
    }

    /// Persisted picker selections; kept in memory only when the cache
    /// directory cannot be used
    pub fn selections(&self) -> SelectionCache {
        match self.config.resolved_cache_dir() {
            Some(dir) => SelectionCache::open(dir.clone()).unwrap_or_else(|e| {
                warn!("Ignoring selection cache in {}: {}", dir.display(), e);
                SelectionCache::new(None)
            }),
            None => SelectionCache::new(None),
        }
    }

    pub fn registry(&self) -> PrefixClient {
        PrefixClient::from_config(&self.config)
    }

    pub fn flow_context<'a>(&'a self, host: &'a dyn Host, registry: &'a dyn Registry) -> FlowContext<'a> {
        FlowContext {
            host,
            registry,
            tool: self.pixi.as_ref(),
            config: &self.config,
            folders: &self.folders,
        }
    }
}
