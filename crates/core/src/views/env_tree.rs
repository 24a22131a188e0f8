use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{NodeKind, TreeNode, parse_site_output};
use crate::{
    project::{Project, python_interpreter_path},
    tool::{PixiTool, ShellCommand, exec_with_timeout},
    types::{EnvironmentInfo, PackageInfo},
};

/// How long `python -m site` may take
const SITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level rows: one per environment of the project
pub fn environment_nodes(project: &Project) -> Vec<TreeNode> {
    project
        .environments()
        .iter()
        .map(|env| {
            TreeNode::new(NodeKind::Environment, &env.name)
                .describe(env.features.join(", "))
                .icon("runtime-extensions-editor-label-icon")
        })
        .collect()
}

/// `{prefix}/conda-meta/{name}-{version}-{build}.json`, when it exists
pub fn meta_file(prefix: &Path, package: &PackageInfo) -> Option<PathBuf> {
    let path = prefix.join("conda-meta").join(package.conda_meta_file_name());
    path.is_file().then_some(path)
}

/// Leaf rows describing one package
pub fn package_facts(
    package: &PackageInfo,
    meta_file: Option<&Path>,
    site_packages: Option<&Path>,
) -> Vec<TreeNode> {
    let mut facts: Vec<TreeNode> = [
        ("kind", &package.kind),
        ("version", &package.version),
        ("source", &package.source),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(key, value)| TreeNode::fact(key, value.as_str()))
    .collect();

    if let Some(path) = meta_file {
        facts.push(TreeNode::fact("meta_file", path.display().to_string()));
    }
    if let Some(path) = site_packages {
        facts.push(TreeNode::fact("site_packages", path.display().to_string()));
    }
    facts
}

/// Expands environments into their installed packages
pub struct EnvironmentTree<'a> {
    tool: &'a dyn PixiTool,
    explicit_only: bool,
}

impl<'a> EnvironmentTree<'a> {
    pub fn new(tool: &'a dyn PixiTool) -> Self {
        Self {
            tool,
            explicit_only: false,
        }
    }

    /// Only list packages the manifest asks for directly
    pub fn explicit_only(mut self, explicit: bool) -> Self {
        self.explicit_only = explicit;
        self
    }

    /// Package rows for one environment, each with its fact leaves
    pub async fn packages(&self, project: &Project, env: &EnvironmentInfo) -> Vec<TreeNode> {
        let packages = self
            .tool
            .list_packages(&project.manifest_path, &env.name, self.explicit_only)
            .await;
        if packages.is_empty() {
            return Vec::new();
        }

        let site_packages = site_packages_dir(env).await;

        packages
            .iter()
            .map(|package| {
                let meta = meta_file(&env.prefix, package);
                let site = site_packages
                    .as_ref()
                    .map(|dir| dir.join(&package.name))
                    .filter(|path| path.exists());

                let mut node = TreeNode::new(NodeKind::Package, &package.name)
                    .describe(package.version.as_str())
                    .icon("package");
                node.children = package_facts(package, meta.as_deref(), site.as_deref());
                node
            })
            .collect()
    }

    /// The full environment tree of a project
    pub async fn build(&self, project: &Project) -> Vec<TreeNode> {
        let mut nodes = environment_nodes(project);
        for (node, env) in nodes.iter_mut().zip(project.environments()) {
            node.children = self.packages(project, env).await;
        }
        nodes
    }
}

/// The interpreter's `site-packages`, asked of the interpreter itself
async fn site_packages_dir(env: &EnvironmentInfo) -> Option<PathBuf> {
    let python = python_interpreter_path(env);
    if !python.is_file() {
        return None;
    }

    let command = ShellCommand::new(python.display().to_string()).args(["-m", "site"]);
    match exec_with_timeout(&command, SITE_TIMEOUT).await {
        Ok(output) => parse_site_output(&output).site_packages().map(PathBuf::from),
        Err(e) => {
            debug!("Could not query site-packages of {}: {}", env.name, e);
            None
        }
    }
}
