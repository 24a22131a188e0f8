use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

use pixi_runner_core::PixiTask;
use pixi_runner_core::views::{task_from_pick, task_quick_pick};

use super::Session;
use crate::host::TerminalHost;

pub async fn run_command(
    session: &Session,
    task: Option<&str>,
    environment: Option<&str>,
    manifest: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let manifest = manifest.map(|m| session.manifest(m)).transpose()?;
    let workspace = session.workspace().await?;
    let tasks = workspace.tasks().await;

    let candidates: Vec<PixiTask> = tasks
        .iter()
        .filter(|t| environment.is_none_or(|env| t.definition.environment == env))
        .filter(|t| {
            manifest
                .as_deref()
                .is_none_or(|m| same_file(&t.definition.manifest_path, m))
        })
        .cloned()
        .collect();

    let selected = match task {
        Some(name) => find_task(&candidates, name)?.clone(),
        None => {
            if candidates.is_empty() {
                bail!("No pixi tasks found");
            }
            let pick = task_quick_pick(&candidates);
            let host = TerminalHost::stdio();
            let chosen = host
                .pick_indices(&pick)
                .and_then(|indices| indices.first().copied())
                .and_then(|index| task_from_pick(&candidates, &pick, index));
            match chosen {
                Some(task) => task.clone(),
                None => return Ok(()),
            }
        }
    };

    let command = &selected.execution;
    if dry_run {
        println!("{}", command.to_shell_command());
        if let Some(ref dir) = command.working_dir {
            println!("Working directory: {}", dir.display());
        }
        return Ok(());
    }

    let shell_cmd = command.to_shell_command();
    info!("Running: {}", shell_cmd);
    let status = command
        .execute()
        .await
        .with_context(|| format!("Failed to execute: {}", shell_cmd))?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

/// The task named `name`. With several matches the one in the `default`
/// environment wins; anything else is reported as ambiguous.
fn find_task<'a>(tasks: &'a [PixiTask], name: &str) -> Result<&'a PixiTask> {
    let matches: Vec<&PixiTask> = tasks.iter().filter(|t| t.label == name).collect();
    match matches.as_slice() {
        [] => bail!("Task '{}' not found", name),
        [only] => Ok(*only),
        several => {
            let defaults: Vec<&&PixiTask> = several
                .iter()
                .filter(|t| t.definition.environment == "default")
                .collect();
            if let [task] = defaults.as_slice() {
                return Ok(**task);
            }
            let places = several
                .iter()
                .map(|t| format!("  {} {} in {}", t.label, t.source, t.definition.manifest_path.display()))
                .collect::<Vec<_>>()
                .join("\n");
            bail!(
                "Task '{}' is defined more than once; narrow it down with --environment or --manifest:\n{}",
                name,
                places
            )
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    let canonical = |p: &Path| p.canonicalize().unwrap_or_else(|_| PathBuf::from(p));
    canonical(a) == canonical(b)
}
