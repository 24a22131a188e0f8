use std::path::Path;
use tracing::warn;

use super::FlowContext;
use crate::{
    cache::{SELECTED_CHANNELS, SelectionCache},
    host::{Level, QuickPick, QuickPickItem, prepare_items},
    registry::Channel,
    tool::ShellCommand,
};

/// Let the user pick channels and return what to pass to `pixi` for each.
///
/// With `defined` (channels a manifest already lists) those are hidden and
/// nothing is preselected; otherwise the configured defaults are.
pub async fn choose_channels(
    ctx: FlowContext<'_>,
    selections: &mut SelectionCache,
    defined: Option<&[String]>,
) -> Option<Vec<String>> {
    let defaults = &ctx.config.default_channels;
    let previous: Vec<String> = selections
        .get(SELECTED_CHANNELS)
        .iter()
        .filter(|c| !defaults.contains(c))
        .cloned()
        .collect();

    let all = match ctx.registry.channels().await {
        Ok(channels) => channels,
        Err(e) => {
            warn!("Could not list channels: {}", e);
            ctx.host
                .notify(Level::Warning, &format!("Could not list channels: {e}"))
                .await;
            Vec::new()
        }
    };
    let others: Vec<&Channel> = all
        .iter()
        .filter(|c| !defaults.contains(&c.name) && !previous.contains(&c.name))
        .collect();

    let mut items = prepare_items([
        (
            "Default Channels",
            defaults
                .iter()
                .map(|c| QuickPickItem::new(c).with_description("(Added in settings)"))
                .collect(),
        ),
        ("Previously Selected Channels", previous.iter().map(QuickPickItem::new).collect()),
        (
            "All Channels",
            others
                .iter()
                .map(|c| QuickPickItem::new(&c.name).with_description(c.description.clone().unwrap_or_default()))
                .collect(),
        ),
    ]);

    let preselected = match defined {
        Some(defined) => {
            items.retain(|item| item.is_separator() || !defined.contains(&item.label));
            Vec::new()
        }
        None => defaults.clone(),
    };
    let pick = QuickPick::new("Select Channels", items)
        .placeholder("Select Channels")
        .many()
        .selected(preselected);

    let picked = ctx.host.quick_pick(pick).await?;

    let mut remembered = previous;
    remembered.extend(picked.iter().cloned());
    if let Err(e) = selections.put(SELECTED_CHANNELS, remembered) {
        warn!("Could not remember selected channels: {}", e);
    }

    Some(
        picked
            .iter()
            .map(|label| match all.iter().find(|c| &c.name == label) {
                Some(channel) => channel.reference().to_string(),
                None => label.clone(),
            })
            .collect(),
    )
}

/// `pixi project channel add C… --manifest-path M` for channels the
/// manifest does not list yet
pub async fn add_channels(
    ctx: FlowContext<'_>,
    selections: &mut SelectionCache,
    target: Option<&Path>,
) -> Option<ShellCommand> {
    let manifest = ctx.resolve_manifest(target).await?;
    let defined = match ctx.project(&manifest).await {
        Some(project) => project.channels(),
        None => Vec::new(),
    };

    let channels = choose_channels(ctx, selections, Some(&defined)).await?;
    if channels.is_empty() {
        return None;
    }

    let command = ctx
        .pixi()
        .args(["project", "channel", "add"])
        .args(channels)
        .arg("--manifest-path")
        .arg(manifest.display().to_string());
    Some(ctx.run(command).await)
}
