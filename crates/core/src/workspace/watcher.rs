use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use super::{RefreshOutcome, Workspace};
use crate::error::Result;

/// A file-system change to a watched manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Changed(PathBuf),
    Created(PathBuf),
    Deleted(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Changed(path) | WatchEvent::Created(path) | WatchEvent::Deleted(path) => path,
        }
    }
}

/// Watches manifest files and funnels their events into one channel.
///
/// Each manifest's directory is watched non-recursively so editors that
/// save by rename are still seen; events for other files are dropped.
pub struct ManifestWatcher {
    _watchers: Vec<RecommendedWatcher>,
    rx: UnboundedReceiver<WatchEvent>,
}

impl ManifestWatcher {
    pub fn new(manifests: &[PathBuf]) -> Result<Self> {
        let (tx, rx) = unbounded_channel();
        let watched: BTreeSet<PathBuf> = manifests.iter().cloned().collect();
        let dirs: BTreeSet<PathBuf> = watched
            .iter()
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .filter(|dir| dir.is_dir())
            .collect();

        let mut watchers = Vec::with_capacity(dirs.len());
        for dir in dirs {
            let mut watcher = forwarding_watcher(tx.clone(), watched.clone())?;
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
            debug!("Watching {}", dir.display());
            watchers.push(watcher);
        }

        Ok(Self {
            _watchers: watchers,
            rx,
        })
    }

    /// Next event, or `None` once every watcher has been dropped
    pub async fn next(&mut self) -> Option<WatchEvent> {
        self.rx.recv().await
    }
}

fn forwarding_watcher(tx: UnboundedSender<WatchEvent>, watched: BTreeSet<PathBuf>) -> Result<RecommendedWatcher> {
    let watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for event in translate(&event, &watched) {
                    let _ = tx.send(event);
                }
            }
            Err(e) => warn!("File watcher error: {}", e),
        },
        notify::Config::default(),
    )?;
    Ok(watcher)
}

fn translate(event: &Event, watched: &BTreeSet<PathBuf>) -> Vec<WatchEvent> {
    event
        .paths
        .iter()
        .filter(|path| watched.contains(path.as_path()))
        .filter_map(|path| {
            let path = path.clone();
            match event.kind {
                EventKind::Create(_) => Some(WatchEvent::Created(path)),
                EventKind::Remove(_) => Some(WatchEvent::Deleted(path)),
                // renames arrive as modifications of either end
                EventKind::Modify(_) if path.exists() => Some(WatchEvent::Changed(path)),
                EventKind::Modify(_) => Some(WatchEvent::Deleted(path)),
                _ => None,
            }
        })
        .collect()
}

/// Feed watcher events into the workspace until the channel closes,
/// reporting every event that changed the cache.
pub async fn run_watch_loop<F>(workspace: &Workspace, mut watcher: ManifestWatcher, mut on_update: F)
where
    F: FnMut(&Path, RefreshOutcome),
{
    while let Some(event) = watcher.next().await {
        let path = event.path().to_path_buf();
        let outcome = workspace.handle_event(event).await;
        debug!("{}: {:?}", path.display(), outcome);
        if outcome != RefreshOutcome::Unchanged {
            on_update(&path, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &Path) -> Event {
        Event::new(kind).add_path(path.to_path_buf())
    }

    #[test]
    fn test_translate_filters_unwatched_paths() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("pixi.toml");
        fs::write(&manifest, "").unwrap();
        let watched: BTreeSet<_> = [manifest.clone()].into();

        let other = temp.path().join("notes.txt");
        assert!(translate(&event(EventKind::Modify(ModifyKind::Any), &other), &watched).is_empty());

        assert_eq!(
            translate(&event(EventKind::Modify(ModifyKind::Any), &manifest), &watched),
            vec![WatchEvent::Changed(manifest.clone())]
        );
        assert_eq!(
            translate(&event(EventKind::Create(CreateKind::File), &manifest), &watched),
            vec![WatchEvent::Created(manifest.clone())]
        );
        assert_eq!(
            translate(&event(EventKind::Remove(RemoveKind::File), &manifest), &watched),
            vec![WatchEvent::Deleted(manifest.clone())]
        );
    }

    #[test]
    fn test_rename_away_counts_as_delete() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("pixi.toml");
        let watched: BTreeSet<_> = [manifest.clone()].into();

        assert_eq!(
            translate(&event(EventKind::Modify(ModifyKind::Any), &manifest), &watched),
            vec![WatchEvent::Deleted(manifest)]
        );
    }

    // macOS reports canonical /private paths for temp dirs
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_watcher_reports_edits() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("pixi.toml");
        fs::write(&manifest, "[workspace]\n").unwrap();

        let mut watcher = ManifestWatcher::new(&[manifest.clone()]).unwrap();
        fs::write(&manifest, "[workspace]\nname = \"x\"\n").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), watcher.next())
            .await
            .expect("no watch event")
            .unwrap();
        assert_eq!(event.path(), manifest.as_path());
    }
}
