use std::path::Path;
use tracing::warn;

use super::FlowContext;
use crate::{
    host::{InputBox, Level, QuickPick, QuickPickItem},
    registry::{MIN_QUERY_LEN, PypiIndex},
    tool::ShellCommand,
};

const DEFAULT_FEATURE: &str = "default";

/// Search conda packages, pick some and a feature, then `pixi add` them
pub async fn add_packages(ctx: FlowContext<'_>, target: Option<&Path>) -> Option<ShellCommand> {
    let manifest = ctx.resolve_manifest(target).await?;
    let query = ask_query(ctx).await?;

    let hits = match ctx.registry.search_packages(&query).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!("Package search failed: {}", e);
            ctx.host
                .notify(Level::Error, &format!("Package search failed: {e}"))
                .await;
            return None;
        }
    };
    let items = hits
        .iter()
        .map(|hit| {
            let description = match hit.version {
                Some(ref version) => format!("{} {}", hit.channel, version),
                None => hit.channel.clone(),
            };
            QuickPickItem::new(&hit.name).with_description(description)
        })
        .collect();

    let packages = pick_packages(ctx, &query, items).await?;
    let feature = choose_feature(ctx, &manifest).await?;
    let command = add_command(ctx.pixi(), &packages, feature.as_deref(), false, &manifest);
    Some(ctx.run(command).await)
}

/// Same as [`add_packages`], searching the PyPI index instead
pub async fn add_pypi_packages(
    ctx: FlowContext<'_>,
    index: &PypiIndex,
    target: Option<&Path>,
) -> Option<ShellCommand> {
    let manifest = ctx.resolve_manifest(target).await?;
    let query = ask_query(ctx).await?;

    let items = index
        .search(&query)
        .into_iter()
        .map(|project| QuickPickItem::new(project.name))
        .collect();

    let packages = pick_packages(ctx, &query, items).await?;
    let feature = choose_feature(ctx, &manifest).await?;
    let command = add_command(ctx.pixi(), &packages, feature.as_deref(), true, &manifest);
    Some(ctx.run(command).await)
}

async fn ask_query(ctx: FlowContext<'_>) -> Option<String> {
    let query = ctx
        .host
        .input_box(InputBox::new("Search Packages", "Package name"))
        .await?;
    let query = query.trim().to_string();
    if query.chars().count() < MIN_QUERY_LEN {
        ctx.host
            .notify(
                Level::Info,
                &format!("Enter at least {MIN_QUERY_LEN} characters to search"),
            )
            .await;
        return None;
    }
    Some(query)
}

async fn pick_packages(ctx: FlowContext<'_>, query: &str, items: Vec<QuickPickItem>) -> Option<Vec<String>> {
    if items.is_empty() {
        ctx.host
            .notify(Level::Info, &format!("No packages match '{query}'"))
            .await;
        return None;
    }
    let picked = ctx
        .host
        .quick_pick(QuickPick::new("Select Packages", items).placeholder("Select packages to add").many())
        .await?;
    (!picked.is_empty()).then_some(picked)
}

/// `None` when cancelled, `Some(None)` for the default feature
async fn choose_feature(ctx: FlowContext<'_>, manifest: &Path) -> Option<Option<String>> {
    let mut features = match ctx.project(manifest).await {
        Some(project) => project.features(),
        None => Vec::new(),
    };
    features.retain(|f| f != DEFAULT_FEATURE);
    features.insert(0, DEFAULT_FEATURE.to_string());

    if features.len() == 1 {
        return Some(None);
    }

    let items = features.iter().map(QuickPickItem::new).collect();
    let pick = QuickPick::new("Feature to add packages to", items)
        .placeholder("Select a feature")
        .selected(vec![DEFAULT_FEATURE.to_string()]);
    let picked = ctx.host.quick_pick(pick).await?;

    Some(
        picked
            .into_iter()
            .next()
            .filter(|feature| feature != DEFAULT_FEATURE),
    )
}

fn add_command(
    pixi: ShellCommand,
    packages: &[String],
    feature: Option<&str>,
    pypi: bool,
    manifest: &Path,
) -> ShellCommand {
    let mut command = pixi.arg("add");
    if pypi {
        command = command.arg("--pypi");
    }
    command = command.args(packages.iter().cloned());
    if let Some(feature) = feature {
        command = command.arg("--feature").arg(feature);
    }
    command
        .arg("--manifest-path")
        .arg(manifest.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::super::fakes::{FakePixi, FakeRegistry};
    use super::*;
    use crate::config::Config;
    use crate::host::testing::ScriptedHost;
    use crate::registry::PypiProject;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn manifest_dir() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("pixi.toml");
        fs::write(&manifest, "[workspace]\n").unwrap();
        (temp, manifest)
    }

    #[tokio::test]
    async fn test_add_packages_to_feature() {
        let (temp, manifest) = manifest_dir();
        let host = ScriptedHost::new().input("num").pick(&["numpy", "numba"]).pick(&["test"]);
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };

        let command = add_packages(ctx, Some(temp.path())).await.unwrap();
        assert_eq!(
            command.to_shell_command(),
            format!("pixi add numpy numba --feature test --manifest-path {}", manifest.display())
        );

        let packages = host.pick_titled("Select Packages");
        assert_eq!(packages.items[0].description.as_deref(), Some("conda-forge 2.1.0"));
        let features = host.pick_titled("Feature to add packages to");
        let labels: Vec<_> = features.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["default", "test"]);
        assert_eq!(features.selected, vec!["default"]);
    }

    #[tokio::test]
    async fn test_default_feature_adds_no_flag() {
        let (temp, manifest) = manifest_dir();
        let host = ScriptedHost::new().input("numpy").pick(&["numpy"]).pick(&["default"]);
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };

        let command = add_packages(ctx, Some(temp.path())).await.unwrap();
        assert_eq!(
            command.to_shell_command(),
            format!("pixi add numpy --manifest-path {}", manifest.display())
        );
    }

    #[tokio::test]
    async fn test_no_hits_is_reported() {
        let (temp, _) = manifest_dir();
        let host = ScriptedHost::new().input("zzz");
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };

        assert!(add_packages(ctx, Some(temp.path())).await.is_none());
        let notifications = host.notifications.lock().unwrap().clone();
        assert_eq!(notifications, vec![(Level::Info, "No packages match 'zzz'".to_string())]);
    }

    #[tokio::test]
    async fn test_add_pypi_packages() {
        let (temp, manifest) = manifest_dir();
        let index = PypiIndex::from_projects(vec![
            PypiProject { name: "requests".into(), last_serial: None },
            PypiProject { name: "rich".into(), last_serial: None },
        ]);
        let host = ScriptedHost::new().input("requests").pick(&["requests"]).pick(&["default"]);
        let registry = FakeRegistry::new();
        let config = Config::default();
        let ctx = FlowContext {
            host: &host,
            registry: &registry,
            tool: &FakePixi,
            config: &config,
            folders: &[],
        };

        let command = add_pypi_packages(ctx, &index, Some(temp.path())).await.unwrap();
        assert_eq!(
            command.to_shell_command(),
            format!("pixi add --pypi requests --manifest-path {}", manifest.display())
        );
    }
}
