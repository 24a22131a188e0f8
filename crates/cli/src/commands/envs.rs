use anyhow::{Context, Result};
use std::path::Path;

use pixi_runner_core::views::{EnvironmentTree, NodeKind, TreeNode, environment_nodes};

use super::Session;
use crate::display::format_environment;

pub async fn envs_command(
    session: &Session,
    json: bool,
    manifest: Option<&Path>,
    packages: bool,
    explicit: bool,
) -> Result<()> {
    let workspace = session.workspace().await?;
    let projects = match manifest {
        Some(manifest) => {
            let manifest = session.manifest(manifest)?;
            let project = workspace
                .project(&manifest)
                .await
                .with_context(|| format!("{} is not a pixi project", manifest.display()))?;
            vec![project]
        }
        None => workspace.projects().await,
    };

    if !json && !packages {
        for project in &projects {
            println!("📦 {}", project.name());
            for env in project.environments() {
                println!("{}", format_environment(env));
            }
        }
        return Ok(());
    }

    let tree = EnvironmentTree::new(session.pixi.as_ref()).explicit_only(explicit);
    let mut nodes = Vec::new();
    for project in &projects {
        let mut node = TreeNode::new(NodeKind::Project, project.name())
            .describe(project.manifest_path.display().to_string());
        node.children = if packages {
            tree.build(project).await
        } else {
            environment_nodes(project)
        };
        nodes.push(node);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else {
        for node in &nodes {
            print!("{}", node.render());
        }
    }
    Ok(())
}
