use anyhow::Result;
use std::path::Path;

use pixi_runner_core::RefreshOutcome;
use pixi_runner_core::workspace::run_watch_loop;

use super::Session;

pub async fn watch_command(session: &Session) -> Result<()> {
    let workspace = session.workspace().await?;
    let watcher = workspace.watcher().await?;

    let manifests = workspace.manifests().await;
    println!("👀 Watching {} manifest(s), press Ctrl-C to stop", manifests.len());
    for manifest in &manifests {
        println!("   {}", manifest.display());
    }

    tokio::select! {
        _ = run_watch_loop(&workspace, watcher, report) => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    Ok(())
}

fn report(path: &Path, outcome: RefreshOutcome) {
    let action = match outcome {
        RefreshOutcome::Refreshed => "🔄 refreshed",
        RefreshOutcome::Coalesced => "⏳ refresh queued",
        RefreshOutcome::Removed => "🗑  removed",
        RefreshOutcome::Unchanged => return,
    };
    println!("{action} {}", path.display());
}
