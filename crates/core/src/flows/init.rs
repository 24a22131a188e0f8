use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{FlowContext, choose_channels};
use crate::{
    cache::{SELECTED_PLATFORMS, SelectionCache},
    host::{InputBox, Level, QuickPick, QuickPickItem, prepare_items},
    tool::ShellCommand,
    types::{Platform, ProjectType},
};

/// Walks the user through `pixi init`
pub struct InitFlow<'a> {
    ctx: FlowContext<'a>,
    selections: &'a mut SelectionCache,
}

impl<'a> InitFlow<'a> {
    pub fn new(ctx: FlowContext<'a>, selections: &'a mut SelectionCache) -> Self {
        Self { ctx, selections }
    }

    /// Initialise a project in `target`, or in a directory chosen by the user
    pub async fn run(self, target: Option<PathBuf>) -> Option<ShellCommand> {
        let dir = self.target_dir(target).await?;
        let project_type = choose_project_type(self.ctx).await?;
        let platforms = choose_platforms(self.ctx, self.selections).await?;
        let channels = choose_channels(self.ctx, self.selections, None).await?;

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            self.ctx
                .error(&format!("Could not create {}: {}", dir.display(), e))
                .await;
            return None;
        }
        info!("Created project directory: {}", dir.display());
        self.ctx
            .host
            .notify(
                Level::Info,
                &format!("Created project directory: {}", dir.display()),
            )
            .await;

        let command = init_command(self.ctx.pixi(), project_type, &platforms, &channels, &dir);
        Some(self.ctx.run(command).await)
    }

    /// An explicit folder wins; an empty workspace asks for a parent folder
    /// and a project name; otherwise the user confirms initialising inside
    /// the workspace and a workspace folder is chosen.
    async fn target_dir(&self, target: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(dir) = target {
            return Some(dir);
        }
        if self.ctx.folders.is_empty() {
            let parent = self
                .ctx
                .host
                .pick_folder("Initialize New Pixi Project in: ")
                .await?;
            let name = self
                .ctx
                .host
                .input_box(InputBox::new("Enter Project Name", "Enter a project name."))
                .await?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            return Some(parent.join(name));
        }
        let answer = self.ctx.host.confirm(CONFIRM_IN_WORKSPACE, &["Yes", "No"]).await;
        if answer.as_deref() != Some("Yes") {
            return None;
        }
        self.ctx.choose_workspace_folder().await
    }
}

const CONFIRM_IN_WORKSPACE: &str = "Initialise a new Pixi project in the current workspace?";

/// Project type picker with the configured default preselected
pub fn project_type_pick(default: ProjectType) -> QuickPick {
    let items = ProjectType::ALL
        .iter()
        .map(|kind| QuickPickItem::new(kind.as_str()))
        .collect();
    QuickPick::new("Select Project Type", items)
        .placeholder(format!("Default : {default}"))
        .selected(vec![default.as_str().to_string()])
        .value(default.as_str())
}

/// Defaults to the configured type when nothing is picked
pub async fn choose_project_type(ctx: FlowContext<'_>) -> Option<ProjectType> {
    let default = ctx.config.default_project_type;
    let picked = ctx.host.quick_pick(project_type_pick(default)).await?;
    Some(
        picked
            .first()
            .and_then(|label| label.parse().ok())
            .unwrap_or(default),
    )
}

/// The current platform followed by whatever else the user selects
pub async fn choose_platforms(
    ctx: FlowContext<'_>,
    selections: &mut SelectionCache,
) -> Option<Vec<String>> {
    let current = ctx.tool.info(None).await.and_then(|info| info.platform());
    if current.is_none() {
        warn!("Could not determine the current platform");
    }

    let defaults: Vec<String> = ctx
        .config
        .default_platforms
        .iter()
        .filter(|p| Some(**p) != current)
        .map(|p| p.to_string())
        .collect();
    let previous: Vec<String> = selections
        .get(SELECTED_PLATFORMS)
        .iter()
        .filter(|p| !defaults.contains(p))
        .cloned()
        .collect();
    let others: Vec<String> = Platform::ALL
        .iter()
        .filter(|p| !matches!(p, Platform::NoArch | Platform::Unknown))
        .filter(|p| Some(**p) != current)
        .map(|p| p.to_string())
        .filter(|p| !defaults.contains(p) && !previous.contains(p))
        .collect();

    let items = prepare_items([
        (
            "Default Platforms",
            defaults
                .iter()
                .map(|p| QuickPickItem::new(p).with_description("(Added in settings)"))
                .collect(),
        ),
        ("Previously Selected Platforms", previous.iter().map(QuickPickItem::new).collect()),
        ("Other Platforms", others.iter().map(QuickPickItem::new).collect()),
    ]);
    let title = match current {
        Some(platform) => format!("Select Platform in addition to current platform: {platform}"),
        None => "Select Platform".to_string(),
    };
    let pick = QuickPick::new(title, items)
        .placeholder("Select Platform")
        .many()
        .selected(defaults.clone());

    let picked = ctx.host.quick_pick(pick).await?;
    if let Err(e) = selections.put(SELECTED_PLATFORMS, picked.clone()) {
        warn!("Could not remember selected platforms: {}", e);
    }

    let mut platforms: Vec<String> = current.iter().map(|p| p.to_string()).collect();
    for platform in picked {
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Some(platforms)
}

/// `pixi init [--format pyproject] --platform P… --channel C… DIR`
pub fn init_command(
    pixi: ShellCommand,
    project_type: ProjectType,
    platforms: &[String],
    channels: &[String],
    dir: &Path,
) -> ShellCommand {
    let mut command = pixi.arg("init");
    if project_type == ProjectType::Pyproject {
        command = command.args(["--format", "pyproject"]);
    }
    for platform in platforms {
        command = command.arg("--platform").arg(platform);
    }
    for channel in channels {
        command = command.arg("--channel").arg(channel);
    }
    command.arg(dir.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::super::fakes::{FakePixi, FakeRegistry};
    use super::*;
    use crate::cache::SELECTED_CHANNELS;
    use crate::config::Config;
    use crate::host::testing::ScriptedHost;
    use tempfile::TempDir;

    fn config() -> Config {
        Config {
            default_channels: vec!["conda-forge".into()],
            default_platforms: vec![Platform::Linux64, Platform::OsxArm64],
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_init_in_explicit_folder() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("new-project");
        let host = ScriptedHost::new()
            .pick(&["pyproject"])
            .pick(&["osx-arm64", "win-64"])
            .pick(&["conda-forge", "private"]);
        let registry = FakeRegistry::new();
        let config = config();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };
        let mut selections = SelectionCache::new(None);

        let command = InitFlow::new(ctx, &mut selections)
            .run(Some(target.clone()))
            .await
            .unwrap();

        assert_eq!(
            command.to_shell_command(),
            format!(
                "pixi init --format pyproject --platform linux-64 --platform osx-arm64 --platform win-64 \
                 --channel conda-forge --channel https://prefix.dev/private {}",
                target.display()
            )
        );
        assert!(target.is_dir());
        assert_eq!(host.commands.lock().unwrap().len(), 1);
        assert_eq!(selections.get(SELECTED_PLATFORMS), ["osx-arm64", "win-64"]);
        assert_eq!(selections.get(SELECTED_CHANNELS), ["conda-forge", "private"]);
    }

    #[tokio::test]
    async fn test_platform_sections() {
        let host = ScriptedHost::new().pick(&[]);
        let registry = FakeRegistry::new();
        let config = config();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };
        let mut selections = SelectionCache::new(None);
        selections
            .put(SELECTED_PLATFORMS, vec!["osx-arm64".into(), "win-64".into()])
            .unwrap();

        let platforms = choose_platforms(ctx, &mut selections).await.unwrap();
        assert_eq!(platforms, vec!["linux-64"]);

        let pick = host.pick_titled("Select Platform in addition to current platform: linux-64");
        let labels: Vec<_> = pick.items.iter().map(|i| i.label.as_str()).collect();
        // the current platform is never offered, defaults are not repeated
        assert_eq!(&labels[..5], &["Default Platforms", "osx-arm64", "Previously Selected Platforms", "win-64", "Other Platforms"]);
        assert!(!labels.contains(&"linux-64"));
        assert_eq!(pick.selected, vec!["osx-arm64"]);
        assert!(pick.can_select_many);
    }

    #[tokio::test]
    async fn test_empty_workspace_asks_for_parent_and_name() {
        let temp = TempDir::new().unwrap();
        let host = ScriptedHost::new()
            .folder(temp.path().to_path_buf())
            .input("demo")
            .pick(&[])
            .pick(&[])
            .pick(&[]);
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };
        let mut selections = SelectionCache::new(None);

        let command = InitFlow::new(ctx, &mut selections).run(None).await.unwrap();
        assert_eq!(
            command.to_shell_command(),
            format!("pixi init --platform linux-64 {}", temp.path().join("demo").display())
        );
    }

    #[tokio::test]
    async fn test_cancelling_stops_quietly() {
        let temp = TempDir::new().unwrap();
        let host = ScriptedHost::new().pick(&["pixi"]).cancel_pick();
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };
        let mut selections = SelectionCache::new(None);

        let outcome = InitFlow::new(ctx, &mut selections)
            .run(Some(temp.path().join("x")))
            .await;
        assert!(outcome.is_none());
        assert!(host.commands.lock().unwrap().is_empty());
        assert!(host.errors().is_empty());
        assert!(!temp.path().join("x").exists());
    }

    #[tokio::test]
    async fn test_open_workspace_asks_for_confirmation() {
        let temp = TempDir::new().unwrap();
        let folders = [temp.path().to_path_buf()];
        let host = ScriptedHost::new().answer("Yes").pick(&[]).pick(&[]).pick(&[]);
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &folders,
        };
        let mut selections = SelectionCache::new(None);

        let command = InitFlow::new(ctx, &mut selections).run(None).await.unwrap();
        assert_eq!(
            command.to_shell_command(),
            format!("pixi init --platform linux-64 {}", temp.path().display())
        );
        assert_eq!(*host.confirmations.lock().unwrap(), vec![CONFIRM_IN_WORKSPACE.to_string()]);
    }

    #[tokio::test]
    async fn test_declining_confirmation_stops_before_any_picker() {
        let temp = TempDir::new().unwrap();
        let folders = [temp.path().to_path_buf()];
        for host in [ScriptedHost::new().answer("No"), ScriptedHost::new()] {
            let registry = FakeRegistry::new();
            let config = Config::default();
            let ctx = FlowContext {
                host: &host,
                registry: &registry,
                tool: &FakePixi,
                config: &config,
                folders: &folders,
            };
            let mut selections = SelectionCache::new(None);

            assert!(InitFlow::new(ctx, &mut selections).run(None).await.is_none());
            assert_eq!(host.confirmations.lock().unwrap().len(), 1);
            assert!(host.shown_picks.lock().unwrap().is_empty());
            assert!(host.commands.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unwritable_target_is_reported() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        std::fs::write(&file, "").unwrap();
        let host = ScriptedHost::new().pick(&["pixi"]).pick(&[]).pick(&[]);
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };
        let mut selections = SelectionCache::new(None);

        let outcome = InitFlow::new(ctx, &mut selections).run(Some(file.join("sub"))).await;
        assert!(outcome.is_none());
        assert!(host.commands.lock().unwrap().is_empty());
        assert_eq!(host.errors().len(), 1);
        assert!(host.errors()[0].starts_with("Could not create"));
    }

    #[test]
    fn test_project_type_pick_preselects_default() {
        let pick = project_type_pick(ProjectType::Pyproject);
        assert_eq!(pick.selected, vec!["pyproject"]);
        assert!(!pick.can_select_many);
        let labels: Vec<_> = pick.choices().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["pixi", "pyproject"]);
    }

    #[test]
    fn test_init_command_shape() {
        let command = init_command(
            ShellCommand::new("pixi"),
            ProjectType::Pixi,
            &["linux-64".into()],
            &[],
            Path::new("/tmp/proj"),
        );
        assert_eq!(command.args, vec!["init", "--platform", "linux-64", "/tmp/proj"]);
    }
}
