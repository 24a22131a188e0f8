use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    Session, add_channel_command, add_package_command, config_command, discover_command,
    envs_command, init_command, run_command, tasks_command, watch_command,
};

#[derive(Parser, Debug)]
#[command(name = "pixi-runner")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug                  Enable debug logging\n    PIXI_RUNNER_EXECUTABLE=<path>   pixi executable to invoke")]
pub struct Cli {
    /// Workspace folder to search; repeat for several (defaults to the current directory)
    #[arg(short = 'w', long = "folder", global = true)]
    pub folders: Vec<PathBuf>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the pixi projects found in the workspace folders
    #[command(visible_alias = "d")]
    Discover,
    /// List every task of every project
    #[command(visible_alias = "t")]
    Tasks {
        /// Show tasks as a folder / project / environment tree
        #[arg(long)]
        tree: bool,
    },
    /// Run a task; without a name, pick one interactively
    #[command(visible_alias = "r")]
    Run {
        /// Task name
        task: Option<String>,

        /// Environment to run the task in
        #[arg(short, long)]
        environment: Option<String>,

        /// Manifest the task is defined in
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Print the command without executing it
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Keep watching manifests and report changes
    Watch,
    /// Show environments and, optionally, their packages
    Envs {
        /// Manifest to inspect (defaults to every discovered project)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// List installed packages
        #[arg(short, long)]
        packages: bool,

        /// Only packages the manifest requests directly
        #[arg(short = 'x', long)]
        explicit: bool,
    },
    /// Initialize a new pixi project interactively
    Init {
        /// Directory to initialize
        dir: Option<PathBuf>,
    },
    /// Add channels to a project
    AddChannel {
        /// Project directory or manifest
        dir: Option<PathBuf>,
    },
    /// Search for packages and add them to a project
    AddPackage {
        /// Project directory or manifest
        dir: Option<PathBuf>,

        /// Search PyPI instead of conda channels
        #[arg(long)]
        pypi: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the configuration to .pixi-runner.json in the current directory
        #[arg(long)]
        init: bool,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the command
    pub async fn execute(self) -> Result<()> {
        let session = Session::load(self.folders)?;
        let json = self.json;

        match self.command {
            Commands::Discover => discover_command(&session, json).await,
            Commands::Tasks { tree } => tasks_command(&session, json, tree).await,
            Commands::Run {
                task,
                environment,
                manifest,
                dry_run,
            } => {
                run_command(
                    &session,
                    task.as_deref(),
                    environment.as_deref(),
                    manifest.as_deref(),
                    dry_run,
                )
                .await
            }
            Commands::Watch => watch_command(&session).await,
            Commands::Envs {
                manifest,
                packages,
                explicit,
            } => envs_command(&session, json, manifest.as_deref(), packages, explicit).await,
            Commands::Init { dir } => init_command(&session, dir).await,
            Commands::AddChannel { dir } => add_channel_command(&session, dir.as_deref()).await,
            Commands::AddPackage { dir, pypi } => {
                add_package_command(&session, dir.as_deref(), pypi).await
            }
            Commands::Config { init, force } => config_command(&session, json, init, force),
        }
    }
}
