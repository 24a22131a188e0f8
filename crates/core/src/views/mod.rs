//! Presentation models: trees and pickers the front-end renders as-is

mod env_tree;
mod quick_pick;
mod site;
mod task_tree;

pub use env_tree::{EnvironmentTree, environment_nodes, meta_file, package_facts};
pub use quick_pick::{task_from_pick, task_quick_pick};
pub use site::{SiteOutput, parse_site_output};
pub use task_tree::{task_tooltip, task_tree};

use serde::Serialize;

use crate::tool::ShellCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Folder,
    Project,
    Environment,
    Task,
    Package,
    /// A key/value leaf such as a package's version
    Fact,
}

/// One row of a tree view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub label: String,
    pub description: String,
    pub kind: NodeKind,
    /// Theme icon name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    pub expanded: bool,
    /// What activating a task row runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<ShellCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: String::new(),
            kind,
            icon: None,
            tooltip: None,
            expanded: false,
            command: None,
            children: Vec::new(),
        }
    }

    pub fn fact(key: &str, value: impl Into<String>) -> Self {
        Self::new(NodeKind::Fact, key).describe(value)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first rendering, two spaces per level
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.label);
        if !self.description.is_empty() {
            out.push_str("  ");
            out.push_str(&self.description);
        }
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }
}
