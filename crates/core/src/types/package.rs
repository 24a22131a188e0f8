use serde::{Deserialize, Serialize};

/// One entry of `pixi list --json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub is_explicit: bool,
}

impl PackageInfo {
    /// File name of the package record under `{prefix}/conda-meta`
    pub fn conda_meta_file_name(&self) -> String {
        format!("{}-{}-{}.json", self.name, self.version, self.build)
    }
}
