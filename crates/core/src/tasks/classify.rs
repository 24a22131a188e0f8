use serde::{Deserialize, Serialize};

/// Orchestrator task groups a task can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskGroup {
    Build,
    Test,
    Clean,
}

impl TaskGroup {
    const KEYWORDS: [(&'static str, TaskGroup); 3] = [
        ("build", TaskGroup::Build),
        ("test", TaskGroup::Test),
        ("clean", TaskGroup::Clean),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskGroup::Build => "build",
            TaskGroup::Test => "test",
            TaskGroup::Clean => "clean",
        }
    }
}

/// Group a task by the keyword its name starts with, ignoring case
pub fn classify(task_name: &str) -> Option<TaskGroup> {
    let name = task_name.trim().to_lowercase();
    TaskGroup::KEYWORDS
        .iter()
        .find(|(keyword, _)| name.starts_with(keyword))
        .map(|(_, group)| *group)
}
