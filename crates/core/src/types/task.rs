use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One environment entry of `pixi task list --json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvFeatureTaskList {
    pub environment: String,
    #[serde(default)]
    pub features: Vec<FeatureTasks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTasks {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
}

/// A task as declared in a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub name: String,
    #[serde(default)]
    pub cmd: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub clean_env: bool,
    #[serde(default)]
    pub inputs: Option<Vec<String>>,
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
}

impl TaskInfo {
    /// Alias tasks have no command of their own and only chain `depends_on`
    pub fn is_alias(&self) -> bool {
        self.cmd.as_deref().is_none_or(|cmd| cmd.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_feature_task_list_structure() {
        let json = r#"[{
            "environment": "development",
            "features": [{
                "name": "feature1",
                "tasks": [{
                    "name": "task1",
                    "cmd": "echo \"Hello World\"",
                    "description": "A sample task",
                    "depends_on": [],
                    "cwd": null,
                    "env": null,
                    "clean_env": true,
                    "inputs": null,
                    "outputs": null
                }]
            }]
        }]"#;

        let list: Vec<EnvFeatureTaskList> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].environment, "development");
        assert_eq!(list[0].features[0].name, "feature1");

        let task = &list[0].features[0].tasks[0];
        assert_eq!(task.name, "task1");
        assert_eq!(task.description.as_deref(), Some("A sample task"));
        assert!(task.clean_env);
        assert!(!task.is_alias());
    }

    #[test]
    fn test_alias_task() {
        let task: TaskInfo =
            serde_json::from_str(r#"{"name": "all", "depends_on": ["build", "test"]}"#).unwrap();
        assert!(task.is_alias());
        assert_eq!(task.depends_on, vec!["build", "test"]);
    }
}
