//! The per-session context: workspace folders, the tool adapter and the
//! per-manifest project cache with its invalidation rules.

mod watcher;

pub use watcher::{ManifestWatcher, WatchEvent, run_watch_loop};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::{
    config::Config,
    discovery::{ManifestLocator, is_manifest},
    error::Result,
    project::{Project, hash_manifest},
    tasks::{PixiTask, flatten},
    tool::PixiTool,
    types::ManifestKind,
};

/// What a call to [`Workspace::refresh`] or [`Workspace::handle_event`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Info and task list were fetched again and the entry replaced
    Refreshed,
    /// A refresh for the same manifest was already running; it will run once more
    Coalesced,
    /// The manifest is gone or no longer a project
    Removed,
    /// Manifest contents match what was fetched last time
    Unchanged,
}

#[derive(Debug, Clone)]
struct Entry {
    project: Project,
    folder: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct RefreshState {
    pending: bool,
}

pub struct Workspace {
    folders: Vec<PathBuf>,
    config: Config,
    tool: Arc<dyn PixiTool>,
    locator: ManifestLocator,
    projects: RwLock<BTreeMap<PathBuf, Entry>>,
    tasks: RwLock<Option<Arc<Vec<PixiTask>>>>,
    /// Manifests with a refresh in flight
    refreshes: Mutex<HashMap<PathBuf, RefreshState>>,
    ignored: AtomicUsize,
    rejected: AtomicUsize,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("folders", &self.folders)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl Workspace {
    pub fn new(folders: Vec<PathBuf>, config: Config, tool: Arc<dyn PixiTool>) -> Result<Self> {
        let locator = ManifestLocator::from_config(&config)?;
        Ok(Self {
            folders,
            config,
            tool,
            locator,
            projects: RwLock::new(BTreeMap::new()),
            tasks: RwLock::new(None),
            refreshes: Mutex::new(HashMap::new()),
            ignored: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
        })
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tool(&self) -> &Arc<dyn PixiTool> {
        &self.tool
    }

    /// Entries skipped by ignore rules during the last [`Workspace::discover`]
    pub fn ignored_count(&self) -> usize {
        self.ignored.load(Ordering::Relaxed)
    }

    /// Candidate manifests `pixi info` did not accept as projects during the
    /// last [`Workspace::discover`]
    pub fn rejected_count(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Walk every folder, validate each candidate through `pixi info` and
    /// replace the cache with the projects found. Returns the project count.
    pub async fn discover(&self) -> usize {
        let mut found = BTreeMap::new();
        let mut ignored = 0;
        let mut rejected = 0;

        for folder in &self.folders {
            let report = self.locator.find(folder);
            ignored += report.ignored;
            debug!(
                "Found {} candidate manifest(s) in {}",
                report.manifests.len(),
                folder.display()
            );

            for manifest in report.manifests {
                match self.load(&manifest).await {
                    Some(project) => {
                        found.insert(
                            manifest,
                            Entry {
                                project,
                                folder: Some(folder.clone()),
                            },
                        );
                    }
                    None => {
                        rejected += 1;
                        info!("Skipping {}: not a pixi project", manifest.display());
                    }
                }
            }
        }

        self.ignored.store(ignored, Ordering::Relaxed);
        self.rejected.store(rejected, Ordering::Relaxed);
        let count = found.len();
        *self.projects.write().await = found;
        self.invalidate_tasks().await;
        info!("Discovered {} pixi project(s)", count);
        count
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.projects
            .read()
            .await
            .values()
            .map(|entry| entry.project.clone())
            .collect()
    }

    pub async fn project(&self, manifest: &Path) -> Option<Project> {
        self.projects
            .read()
            .await
            .get(manifest)
            .map(|entry| entry.project.clone())
    }

    /// Workspace folder a cached manifest was discovered in
    pub async fn folder_of(&self, manifest: &Path) -> Option<PathBuf> {
        self.projects
            .read()
            .await
            .get(manifest)
            .and_then(|entry| entry.folder.clone())
    }

    pub async fn manifests(&self) -> Vec<PathBuf> {
        self.projects.read().await.keys().cloned().collect()
    }

    /// Flattened tasks of every cached project, built on first use after
    /// each invalidation.
    pub async fn tasks(&self) -> Arc<Vec<PixiTask>> {
        if let Some(tasks) = self.tasks.read().await.as_ref() {
            return Arc::clone(tasks);
        }

        let mut memo = self.tasks.write().await;
        if let Some(tasks) = memo.as_ref() {
            return Arc::clone(tasks);
        }

        let executable = self.config.executable();
        let tasks: Vec<PixiTask> = self
            .projects
            .read()
            .await
            .values()
            .flat_map(|entry| flatten(&entry.project, executable, entry.folder.as_deref()))
            .collect();
        debug!("Flattened {} task(s)", tasks.len());

        let tasks = Arc::new(tasks);
        *memo = Some(Arc::clone(&tasks));
        tasks
    }

    /// Re-fetch one manifest. Calls that overlap a running refresh of the
    /// same manifest are folded into a single extra run.
    pub async fn refresh(&self, manifest: &Path) -> RefreshOutcome {
        {
            let mut refreshes = self.lock_refreshes();
            if let Some(state) = refreshes.get_mut(manifest) {
                state.pending = true;
                debug!("Refresh of {} already running", manifest.display());
                return RefreshOutcome::Coalesced;
            }
            refreshes.insert(manifest.to_path_buf(), RefreshState::default());
        }

        loop {
            let outcome = self.reload(manifest).await;

            let mut refreshes = self.lock_refreshes();
            match refreshes.get_mut(manifest) {
                Some(state) if state.pending => state.pending = false,
                _ => {
                    refreshes.remove(manifest);
                    return outcome;
                }
            }
        }
    }

    /// Apply a file-system event for a manifest
    pub async fn handle_event(&self, event: WatchEvent) -> RefreshOutcome {
        match event {
            WatchEvent::Changed(path) => {
                let cached_hash = self
                    .projects
                    .read()
                    .await
                    .get(&path)
                    .map(|entry| entry.project.manifest_hash.clone());
                if let Some(Some(hash)) = cached_hash {
                    if hash_manifest(&path).as_deref() == Some(hash.as_str()) {
                        debug!("{} unchanged, skipping refresh", path.display());
                        return RefreshOutcome::Unchanged;
                    }
                }
                self.refresh(&path).await
            }
            WatchEvent::Created(path) => {
                if !is_manifest(&path) {
                    return RefreshOutcome::Unchanged;
                }
                self.refresh(&path).await
            }
            WatchEvent::Deleted(path) => {
                error!("Manifest {} was deleted", path.display());
                self.remove(&path).await;
                RefreshOutcome::Removed
            }
        }
    }

    /// Watcher over every cached manifest plus the workspace folders
    pub async fn watcher(&self) -> Result<ManifestWatcher> {
        let mut paths = self.manifests().await;
        for folder in &self.folders {
            for (name, _) in ManifestKind::FILE_NAMES {
                paths.push(folder.join(name));
            }
        }
        paths.sort();
        paths.dedup();
        ManifestWatcher::new(&paths)
    }

    async fn reload(&self, manifest: &Path) -> RefreshOutcome {
        match self.load(manifest).await {
            Some(project) => {
                let folder = self.folder_for(manifest);
                self.projects
                    .write()
                    .await
                    .insert(manifest.to_path_buf(), Entry { project, folder });
                self.invalidate_tasks().await;
                info!("Refreshed {}", manifest.display());
                RefreshOutcome::Refreshed
            }
            None => {
                self.remove(manifest).await;
                RefreshOutcome::Removed
            }
        }
    }

    async fn load(&self, manifest: &Path) -> Option<Project> {
        let hash = hash_manifest(manifest);
        let info = self.tool.info(Some(manifest)).await?;
        if !info.is_project() {
            return None;
        }
        let tasks = self.tool.task_list(manifest).await;
        Project::with_hash(manifest.to_path_buf(), info, tasks, hash)
    }

    async fn remove(&self, manifest: &Path) {
        if self.projects.write().await.remove(manifest).is_some() {
            self.invalidate_tasks().await;
        }
    }

    async fn invalidate_tasks(&self) {
        *self.tasks.write().await = None;
    }

    fn folder_for(&self, manifest: &Path) -> Option<PathBuf> {
        self.folders
            .iter()
            .filter(|folder| manifest.starts_with(folder))
            .max_by_key(|folder| folder.components().count())
            .cloned()
    }

    fn lock_refreshes(&self) -> MutexGuard<'_, HashMap<PathBuf, RefreshState>> {
        self.refreshes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnvFeatureTaskList, FeatureTasks, PackageInfo, PixiInfo, ProjectInfo, TaskInfo};
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    /// Treats a manifest as a project when it contains `[workspace]` and
    /// reads tasks from `name = "cmd"` lines. `edit_during_fetch` is written
    /// over the manifest once, right after a task list was read.
    #[derive(Default)]
    struct FakePixi {
        info_calls: AtomicUsize,
        task_calls: AtomicUsize,
        edit_during_fetch: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl PixiTool for FakePixi {
        async fn info(&self, manifest: Option<&Path>) -> Option<PixiInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            let manifest = manifest?;
            let contents = fs::read_to_string(manifest).ok()?;
            if !contents.contains("[workspace]") {
                return Some(PixiInfo::default());
            }
            Some(PixiInfo {
                project_info: Some(ProjectInfo {
                    name: manifest.parent()?.file_name()?.to_string_lossy().into_owned(),
                    manifest_path: manifest.to_path_buf(),
                    version: None,
                }),
                ..Default::default()
            })
        }

        async fn task_list(&self, manifest: &Path) -> Vec<EnvFeatureTaskList> {
            self.task_calls.fetch_add(1, Ordering::SeqCst);
            let contents = fs::read_to_string(manifest).unwrap_or_default();
            if let Some(edit) = self.edit_during_fetch.lock().unwrap().take() {
                fs::write(manifest, edit).unwrap();
            }
            let tasks = contents
                .lines()
                .filter_map(|line| line.split_once(" = "))
                .filter(|(_, cmd)| cmd.starts_with('"'))
                .map(|(name, cmd)| TaskInfo {
                    name: name.trim().to_string(),
                    cmd: Some(cmd.trim_matches('"').to_string()),
                    ..Default::default()
                })
                .collect();
            vec![EnvFeatureTaskList {
                environment: "default".to_string(),
                features: vec![FeatureTasks {
                    name: "default".to_string(),
                    tasks,
                }],
            }]
        }

        async fn list_packages(&self, _: &Path, _: &str, _: bool) -> Vec<PackageInfo> {
            Vec::new()
        }
    }

    fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn workspace(root: &Path, tool: Arc<FakePixi>) -> Workspace {
        Workspace::new(vec![root.to_path_buf()], Config::default(), tool).unwrap()
    }

    #[tokio::test]
    async fn test_discover_counts_only_valid_projects() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/pixi.toml", "[workspace]\n[tasks]\nbuild = \"make\"\n");
        write(temp.path(), "b/pixi.toml", "[workspace]\n");
        write(temp.path(), "broken/pixi.toml", "not a manifest");
        write(temp.path(), "py/pyproject.toml", "[project]\nname = \"py\"\n");
        write(temp.path(), "c/other.toml", "[workspace]\n");

        let tool = Arc::new(FakePixi::default());
        let ws = workspace(temp.path(), tool.clone());

        assert_eq!(ws.discover().await, 2);
        assert_eq!(ws.rejected_count(), 1);
        assert_eq!(ws.ignored_count(), 0);
        assert_eq!(tool.info_calls.load(Ordering::SeqCst), 3);
        assert_eq!(tool.task_calls.load(Ordering::SeqCst), 2);

        let names: Vec<_> = ws.projects().await.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_tasks_are_memoised_until_invalidated() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\nbuild = \"make\"\n");

        let ws = workspace(temp.path(), Arc::new(FakePixi::default()));
        ws.discover().await;

        let first = ws.tasks().await;
        let second = ws.tasks().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].scope.as_deref(), Some(temp.path()));

        assert_eq!(ws.refresh(&manifest).await, RefreshOutcome::Refreshed);
        let third = ws.tasks().await;
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[tokio::test]
    async fn test_edit_triggers_exactly_one_refetch() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\nbuild = \"make\"\n");

        let tool = Arc::new(FakePixi::default());
        let ws = workspace(temp.path(), tool.clone());
        ws.discover().await;
        assert_eq!(tool.info_calls.load(Ordering::SeqCst), 1);

        fs::write(&manifest, "[workspace]\nbuild = \"make\"\ntest-all = \"pytest\"\n").unwrap();
        let outcome = ws.handle_event(WatchEvent::Changed(manifest.clone())).await;

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(tool.info_calls.load(Ordering::SeqCst), 2);
        assert_eq!(tool.task_calls.load(Ordering::SeqCst), 2);

        let labels: Vec<_> = ws.tasks().await.iter().map(|t| t.label.clone()).collect();
        assert_eq!(labels, vec!["build", "test-all"]);
    }

    #[tokio::test]
    async fn test_unchanged_contents_skip_refetch() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\n");

        let tool = Arc::new(FakePixi::default());
        let ws = workspace(temp.path(), tool.clone());
        ws.discover().await;

        let outcome = ws.handle_event(WatchEvent::Changed(manifest)).await;
        assert_eq!(outcome, RefreshOutcome::Unchanged);
        assert_eq!(tool.info_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_coalesce() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\n");

        let tool = Arc::new(FakePixi::default());
        let ws = workspace(temp.path(), tool.clone());

        let (first, second, third) = tokio::join!(
            ws.refresh(&manifest),
            ws.refresh(&manifest),
            ws.refresh(&manifest)
        );

        assert_eq!(first, RefreshOutcome::Refreshed);
        assert_eq!(second, RefreshOutcome::Coalesced);
        assert_eq!(third, RefreshOutcome::Coalesced);
        // the running refresh plus one coalesced re-run
        assert_eq!(tool.info_calls.load(Ordering::SeqCst), 2);
        assert!(ws.project(&manifest).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_removes_project() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\nbuild = \"make\"\n");

        let ws = workspace(temp.path(), Arc::new(FakePixi::default()));
        ws.discover().await;
        assert_eq!(ws.tasks().await.len(), 1);

        fs::remove_file(&manifest).unwrap();
        let outcome = ws.handle_event(WatchEvent::Deleted(manifest.clone())).await;

        assert_eq!(outcome, RefreshOutcome::Removed);
        assert!(ws.project(&manifest).await.is_none());
        assert!(ws.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn test_created_manifest_is_added() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), Arc::new(FakePixi::default()));
        assert_eq!(ws.discover().await, 0);

        let manifest = write(temp.path(), "pixi.toml", "[workspace]\n");
        let outcome = ws.handle_event(WatchEvent::Created(manifest.clone())).await;

        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert_eq!(ws.folder_of(&manifest).await.as_deref(), Some(temp.path()));
    }

    #[tokio::test]
    async fn test_manifest_that_stops_being_a_project_is_dropped() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\n");

        let ws = workspace(temp.path(), Arc::new(FakePixi::default()));
        ws.discover().await;

        fs::write(&manifest, "garbage").unwrap();
        let outcome = ws.handle_event(WatchEvent::Changed(manifest.clone())).await;
        assert_eq!(outcome, RefreshOutcome::Removed);
        assert!(ws.projects().await.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_count_is_recorded() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/pixi.toml", "[workspace]\n");
        write(temp.path(), "vendor/x/pixi.toml", "[workspace]\n");

        let config = Config {
            ignore: vec!["vendor".to_string()],
            ..Config::default()
        };
        let ws = Workspace::new(vec![temp.path().to_path_buf()], config, Arc::new(FakePixi::default())).unwrap();

        assert_eq!(ws.discover().await, 1);
        assert_eq!(ws.ignored_count(), 1);
        assert_eq!(ws.rejected_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_during_fetch_is_refetched() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\nbuild = \"make\"\n");

        let tool = Arc::new(FakePixi::default());
        let ws = workspace(temp.path(), tool.clone());
        ws.discover().await;

        fs::write(&manifest, "[workspace]\nbuild = \"make\"\ntest = \"pytest\"\n").unwrap();
        *tool.edit_during_fetch.lock().unwrap() =
            Some("[workspace]\nbuild = \"make\"\ntest = \"pytest\"\nlint = \"ruff\"\n".to_string());

        // the first refresh reads the manifest before the second edit lands
        let first = ws.handle_event(WatchEvent::Changed(manifest.clone())).await;
        assert_eq!(first, RefreshOutcome::Refreshed);
        let labels: Vec<_> = ws.tasks().await.iter().map(|t| t.label.clone()).collect();
        assert_eq!(labels, vec!["build", "test"]);

        let second = ws.handle_event(WatchEvent::Changed(manifest.clone())).await;
        assert_eq!(second, RefreshOutcome::Refreshed);
        let labels: Vec<_> = ws.tasks().await.iter().map(|t| t.label.clone()).collect();
        assert_eq!(labels, vec!["build", "test", "lint"]);

        let third = ws.handle_event(WatchEvent::Changed(manifest)).await;
        assert_eq!(third, RefreshOutcome::Unchanged);
    }

    // macOS reports canonical /private paths for temp dirs
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_watch_loop_applies_file_edits() {
        let temp = TempDir::new().unwrap();
        let manifest = write(temp.path(), "a/pixi.toml", "[workspace]\nbuild = \"make\"\n");

        let tool = Arc::new(FakePixi::default());
        let ws = workspace(temp.path(), tool.clone());
        ws.discover().await;
        let watcher = ws.watcher().await.unwrap();

        let mut updates = Vec::new();
        let edit = async {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            fs::write(&manifest, "[workspace]\nbuild = \"make\"\ntest = \"pytest\"\n").unwrap();
        };
        let watch = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            run_watch_loop(&ws, watcher, |path, outcome| updates.push((path.to_path_buf(), outcome))),
        );
        let (timed_out, ()) = tokio::join!(watch, edit);

        assert!(timed_out.is_err());
        assert!(updates.contains(&(manifest.clone(), RefreshOutcome::Refreshed)));
        assert_eq!(ws.tasks().await.len(), 2);
    }
}
