use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key under which previously chosen channels are remembered
pub const SELECTED_CHANNELS: &str = "selectedChannels";
/// Key under which previously chosen platforms are remembered
pub const SELECTED_PLATFORMS: &str = "selectedPlatforms";

const FILE_NAME: &str = "selections.json";

/// Remembers what the user picked in earlier flows
#[derive(Debug, Default)]
pub struct SelectionCache {
    entries: BTreeMap<String, Vec<String>>,
    cache_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionFile {
    #[serde(default)]
    entries: BTreeMap<String, Vec<String>>,
}

impl SelectionCache {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            entries: BTreeMap::new(),
            cache_dir,
        }
    }

    /// Create a cache backed by `cache_dir` and read whatever is stored there
    pub fn open(cache_dir: PathBuf) -> Result<Self> {
        let mut cache = Self::new(Some(cache_dir));
        cache.load_from_disk()?;
        Ok(cache)
    }

    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replace the stored values, keeping first occurrences only
    pub fn put(&mut self, key: &str, values: Vec<String>) -> Result<()> {
        let mut unique: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        self.entries.insert(key.to_string(), unique);

        if self.cache_dir.is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();

        if let Some(path) = self.file_path() {
            let _ = std::fs::remove_file(path);
        }
    }

    pub fn load_from_disk(&mut self) -> Result<()> {
        let Some(path) = self.file_path() else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }

        let contents = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<SelectionFile>(&contents) {
            Ok(file) => self.entries = file.entries,
            Err(e) => {
                tracing::warn!("Ignoring unreadable selection cache {}: {}", path.display(), e);
            }
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = self.file_path() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let file = SelectionFile {
            entries: self.entries.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::CacheError(format!("Failed to serialize selections: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.cache_dir.as_deref().map(|dir| dir.join(FILE_NAME))
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }
}
