use std::path::Path;
use tracing::debug;

use super::{NodeKind, TreeNode};
use crate::tasks::PixiTask;

/// Workspace folder → project → environment → task, in the order tasks
/// first appear. Tasks without a folder are left out.
pub fn task_tree(tasks: &[PixiTask]) -> Vec<TreeNode> {
    let mut folders: Vec<TreeNode> = Vec::new();

    for task in tasks {
        let Some(scope) = task.scope.as_deref() else {
            debug!("Task {} has no workspace folder", task.label);
            continue;
        };
        let folder = child(&mut folders, NodeKind::Folder, &folder_name(scope), |node| {
            node.icon("folder-library").describe(scope.display().to_string())
        });
        folder.expanded = true;

        let project = child(&mut folder.children, NodeKind::Project, &task.definition.project, |node| {
            node.icon("folder")
        });
        let environment = child(
            &mut project.children,
            NodeKind::Environment,
            &task.definition.environment,
            |node| node.icon("runtime-extensions-editor-label-icon"),
        );
        environment.children.push(task_node(task));
    }

    folders
}

/// Markdown hover text for a task
pub fn task_tooltip(task: &PixiTask) -> String {
    let definition = &task.definition;
    let command = definition
        .cmd
        .clone()
        .unwrap_or_else(|| format!("depends on: {}", definition.task_info.depends_on.join(", ")));

    format!(
        "# **Task Name:** {}\n\n\
         **Description:** {}\n\n\
         **Command:** {}\n\n\
         **Environment:** {}\n\n\
         **Project:** {}\n\n\
         **Manifest Path:** {}\n\n",
        definition.task,
        task.summary(),
        command,
        definition.environment,
        definition.project,
        definition.manifest_path.display(),
    )
}

fn task_node(task: &PixiTask) -> TreeNode {
    let mut node = TreeNode::new(NodeKind::Task, &task.label).describe(task.summary());
    node.tooltip = Some(task_tooltip(task));
    node.command = Some(task.execution.clone());
    node
}

fn child<'a>(
    nodes: &'a mut Vec<TreeNode>,
    kind: NodeKind,
    label: &str,
    init: impl FnOnce(TreeNode) -> TreeNode,
) -> &'a mut TreeNode {
    let index = match nodes.iter().position(|n| n.kind == kind && n.label == label) {
        Some(index) => index,
        None => {
            nodes.push(init(TreeNode::new(kind, label)));
            nodes.len() - 1
        }
    };
    &mut nodes[index]
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}
