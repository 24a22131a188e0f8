use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::classify::{TaskGroup, classify};
use crate::{
    project::Project,
    tool::{ShellCommand, run_command},
    types::TaskInfo,
};

/// Task type under which tasks are registered with the orchestrator
pub const TASK_TYPE: &str = "pixi";

/// Identity of a task as the orchestrator stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    #[serde(rename = "type")]
    pub task_type: String,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absent for alias tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    /// The same task name may appear once per environment
    pub environment: String,
    pub feature: String,
    pub project: String,
    pub manifest_path: PathBuf,
    pub task_info: TaskInfo,
}

/// A task paired with the environment, feature and project that own it,
/// plus everything needed to show and run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixiTask {
    pub definition: TaskDefinition,
    pub label: String,
    pub detail: String,
    pub source: String,
    pub group: Option<TaskGroup>,
    /// Workspace folder the manifest was discovered in
    pub scope: Option<PathBuf>,
    pub execution: ShellCommand,
}

impl PixiTask {
    pub fn new(
        project: &Project,
        environment: &str,
        feature: &str,
        task: &TaskInfo,
        executable: &str,
        scope: Option<&Path>,
    ) -> Self {
        let description = task
            .description
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .cloned();
        let cmd = if task.is_alias() { None } else { task.cmd.clone() };

        let definition = TaskDefinition {
            task_type: TASK_TYPE.to_string(),
            task: task.name.clone(),
            description,
            cmd,
            environment: environment.to_string(),
            feature: feature.to_string(),
            project: project.name().to_string(),
            manifest_path: project.manifest_path.clone(),
            task_info: task.clone(),
        };

        let execution = run_command(executable, &project.manifest_path, environment, &task.name)
            .with_working_dir(project.root());

        Self {
            label: task.name.clone(),
            detail: detail(&definition),
            source: format!("({environment})"),
            group: classify(&task.name),
            scope: scope.map(Path::to_path_buf),
            execution,
            definition,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.definition.cmd.is_none()
    }

    /// Description, or the command when there is none
    pub fn summary(&self) -> String {
        self.definition
            .description
            .clone()
            .or_else(|| self.definition.cmd.clone())
            .unwrap_or_else(|| format!("depends on: {}", self.definition.task_info.depends_on.join(", ")))
    }
}

/// One-line detail text using the host's icon syntax
fn detail(definition: &TaskDefinition) -> String {
    match (&definition.description, &definition.cmd) {
        (Some(description), Some(cmd)) => format!("$(info) {description}; $(terminal) {cmd}"),
        (None, Some(cmd)) => format!("$(terminal) {cmd}"),
        (description, None) => {
            let depends_on = &definition.task_info.depends_on;
            let chain = if depends_on.is_empty() {
                "$(link) alias".to_string()
            } else {
                format!("$(link) depends on: {}", depends_on.join(", "))
            };
            match description {
                Some(description) => format!("$(info) {description}; {chain}"),
                None => chain,
            }
        }
    }
}

/// All tasks of a project, environment by environment, in declaration order
pub fn flatten(project: &Project, executable: &str, scope: Option<&Path>) -> Vec<PixiTask> {
    project
        .tasks
        .iter()
        .flat_map(|env| {
            env.features.iter().flat_map(move |feature| {
                feature.tasks.iter().map(move |task| {
                    PixiTask::new(project, &env.environment, &feature.name, task, executable, scope)
                })
            })
        })
        .collect()
}

/// Flatten several projects, each paired with its workspace folder
pub fn flatten_all<'a>(
    projects: impl IntoIterator<Item = (&'a Project, Option<&'a Path>)>,
    executable: &str,
) -> Vec<PixiTask> {
    projects
        .into_iter()
        .flat_map(|(project, scope)| flatten(project, executable, scope))
        .collect()
}
