//! Typed records mirroring the JSON the `pixi` executable prints

pub mod info;
pub mod package;
pub mod platform;
pub mod task;

pub use info::{EnvironmentInfo, GlobalInfo, PixiInfo, ProjectInfo};
pub use package::PackageInfo;
pub use platform::{ManifestKind, Platform, ProjectType};
pub use task::{EnvFeatureTaskList, FeatureTasks, TaskInfo};
