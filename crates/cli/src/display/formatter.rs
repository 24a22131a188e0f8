use serde::Serialize;
use std::path::PathBuf;

use pixi_runner_core::{PixiTask, Project, types::EnvironmentInfo};

/// What `discover --json` prints per project
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub manifest_path: PathBuf,
    pub environments: Vec<String>,
    pub task_count: usize,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name().to_string(),
            version: project.version().map(str::to_string),
            manifest_path: project.manifest_path.clone(),
            environments: project.environment_names(),
            task_count: project.task_count(),
        }
    }
}

pub fn format_project(project: &Project) -> String {
    let mut out = format!("📦 {}", project.name());
    if let Some(version) = project.version() {
        out.push_str(&format!(" {version}"));
    }
    out.push_str(&format!("\n   📄 {}", project.manifest_path.display()));
    out.push_str(&format!(
        "\n   🌐 environments: {}",
        project.environment_names().join(", ")
    ));
    out.push_str(&format!("\n   🔧 tasks: {}", project.task_count()));
    out
}

/// `name (env)  summary`, with the task group when it has one
pub fn format_task(task: &PixiTask) -> String {
    let mut out = format!("{} {}", task.label, task.source);
    if let Some(group) = task.group {
        out.push_str(&format!(" [{}]", group.as_str()));
    }
    out.push_str(&format!("  {}", task.summary()));
    out
}

/// Tasks grouped under their project heading
pub fn task_rows(tasks: &[PixiTask]) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current: Option<(&str, &PathBuf)> = None;
    for task in tasks {
        let key = (task.definition.project.as_str(), &task.definition.manifest_path);
        if current != Some(key) {
            rows.push(format!("{} ({})", key.0, key.1.display()));
            current = Some(key);
        }
        rows.push(format!("  {}", format_task(task)));
    }
    rows
}

pub fn format_environment(env: &EnvironmentInfo) -> String {
    let mut out = format!("🌐 {}", env.name);
    if !env.features.is_empty() {
        out.push_str(&format!("  features: {}", env.features.join(", ")));
    }
    if let Some(group) = &env.solve_group {
        out.push_str(&format!("  solve-group: {group}"));
    }
    out.push_str(&format!("\n   prefix: {}", env.prefix.display()));
    out
}
