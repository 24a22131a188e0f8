//! Locating pixi manifests inside workspace folders

pub mod locator;

pub use locator::{DiscoveryReport, ManifestLocator, find_project_file, is_manifest};
