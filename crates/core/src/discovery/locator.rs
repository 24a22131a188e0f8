use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::Config,
    error::{Error, Result},
    types::ManifestKind,
};

/// Directories never descended into
const ALWAYS_SKIPPED: [&str; 3] = [".pixi", ".git", "node_modules"];

/// Outcome of walking one workspace folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub manifests: Vec<PathBuf>,
    /// Entries excluded by ignore globs or `.gitignore`
    pub ignored: usize,
}

/// Bounded-depth manifest search honouring ignore globs and, optionally,
/// the folder's `.gitignore`.
#[derive(Debug, Clone)]
pub struct ManifestLocator {
    search_depth: usize,
    ignore: GlobSet,
    use_gitignore: bool,
}

impl ManifestLocator {
    /// `search_depth` is the number of directory levels below a folder that
    /// may hold manifests; 0 means only the folder itself.
    pub fn new(search_depth: usize, ignore_patterns: &[String], use_gitignore: bool) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in ignore_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::PatternError(format!("Invalid ignore pattern '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let ignore = builder
            .build()
            .map_err(|e| Error::PatternError(e.to_string()))?;

        Ok(Self {
            search_depth,
            ignore,
            use_gitignore,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.effective_search_depth(),
            &config.ignore,
            config.gitignore,
        )
    }

    pub fn search_depth(&self) -> usize {
        self.search_depth
    }

    /// Walk `folder` and return candidate manifests in path order
    pub fn find(&self, folder: &Path) -> DiscoveryReport {
        let gitignore = if self.use_gitignore {
            load_gitignore(folder)
        } else {
            None
        };

        let mut ignored = 0;
        let mut manifests = Vec::new();
        let walker = WalkDir::new(folder)
            .max_depth(self.search_depth + 1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if entry.file_type().is_dir() && is_always_skipped(entry) {
                    return false;
                }
                if self.is_ignored(folder, entry, gitignore.as_ref()) {
                    trace!("Ignoring {}", entry.path().display());
                    ignored += 1;
                    return false;
                }
                true
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && is_manifest(entry.path()) {
                manifests.push(entry.into_path());
            }
        }

        let report = DiscoveryReport { manifests, ignored };
        debug!(
            "Found {} manifest(s) in {} ({} ignored)",
            report.manifests.len(),
            folder.display(),
            report.ignored
        );
        report
    }

    fn is_ignored(&self, folder: &Path, entry: &DirEntry, gitignore: Option<&Gitignore>) -> bool {
        let is_dir = entry.file_type().is_dir();

        if let Ok(relative) = entry.path().strip_prefix(folder) {
            if self.ignore.is_match(relative) {
                return true;
            }
        }

        gitignore
            .map(|gi| gi.matched(entry.path(), is_dir).is_ignore())
            .unwrap_or(false)
    }
}

fn is_always_skipped(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| ALWAYS_SKIPPED.contains(&name))
}

fn load_gitignore(folder: &Path) -> Option<Gitignore> {
    let path = folder.join(".gitignore");
    if !path.is_file() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(folder);
    if let Some(e) = builder.add(&path) {
        warn!("Failed to read {}: {}", path.display(), e);
    }
    match builder.build() {
        Ok(gitignore) => Some(gitignore),
        Err(e) => {
            warn!("Invalid .gitignore in {}: {}", folder.display(), e);
            None
        }
    }
}

/// A file is a manifest when its name is one of the two conventions and, for
/// `pyproject.toml`, its contents declare a pixi table.
pub fn is_manifest(path: &Path) -> bool {
    let Some(kind) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(ManifestKind::from_file_name)
    else {
        return false;
    };

    match kind {
        ManifestKind::PixiToml => true,
        ManifestKind::PyprojectToml => std::fs::read_to_string(path)
            .map(|contents| kind.declares_pixi(&contents))
            .unwrap_or(false),
    }
}

/// Manifest directly inside `dir`, preferring `pixi.toml`
pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
    ManifestKind::FILE_NAMES
        .iter()
        .map(|(name, _)| dir.join(name))
        .find(|path| path.is_file() && is_manifest(path))
}
