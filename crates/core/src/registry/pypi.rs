use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const PYPI_URL: &str = "https://pypi.org";
/// Queries shorter than this return nothing
pub const MIN_QUERY_LEN: usize = 2;
pub const SEARCH_LIMIT: usize = 10;

const SIMPLE_JSON: &str = "application/vnd.pypi.simple.v1+json";
const CACHE_FILE: &str = "packages-cache.json";

/// The PEP 691 JSON form of the `/simple` index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PypiSimple {
    #[serde(default)]
    pub meta: Option<PypiMeta>,
    #[serde(default)]
    pub projects: Vec<PypiProject>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PypiMeta {
    #[serde(rename = "api-version")]
    pub api_version: String,
    #[serde(rename = "_last-serial", default)]
    pub last_serial: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PypiProject {
    pub name: String,
    #[serde(rename = "_last-serial", default)]
    pub last_serial: Option<u64>,
}

/// Locally cached list of every PyPI project, searchable by fuzzy name match
#[derive(Debug)]
pub struct PypiIndex {
    base_url: String,
    cache_dir: Option<PathBuf>,
    client: Client,
    projects: RwLock<Vec<PypiProject>>,
}

impl PypiIndex {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self::with_url(PYPI_URL, cache_dir)
    }

    pub fn with_url(base_url: impl Into<String>, cache_dir: Option<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            cache_dir,
            client: Client::new(),
            projects: RwLock::new(Vec::new()),
        }
    }

    /// An index over a fixed project list, never touching network or disk
    pub fn from_projects(projects: Vec<PypiProject>) -> Self {
        let index = Self::new(None);
        index.replace(projects);
        index
    }

    pub fn len(&self) -> usize {
        self.projects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the on-disk copy, then try to refresh it from PyPI.
    ///
    /// A failed download is only an error when there is no cached copy to
    /// fall back on. Returns the number of projects available.
    pub async fn load(&self) -> Result<usize> {
        let cached = self.load_cached();

        match self.fetch().await {
            Ok(simple) => {
                if let Err(e) = self.write_cache(&simple) {
                    warn!("Could not cache the PyPI index: {}", e);
                }
                self.replace(simple.projects);
            }
            Err(e) if cached > 0 => {
                warn!("Using cached PyPI index, refresh failed: {}", e);
            }
            Err(e) => return Err(e),
        }
        Ok(self.len())
    }

    /// Read the cache file if there is one. Returns the number of projects read.
    pub fn load_cached(&self) -> usize {
        let Some(path) = self.cache_file() else {
            return 0;
        };
        match read_cache(&path) {
            Some(simple) => {
                let count = simple.projects.len();
                self.replace(simple.projects);
                debug!("Loaded {} PyPI project(s) from {}", count, path.display());
                count
            }
            None => 0,
        }
    }

    pub async fn fetch(&self) -> Result<PypiSimple> {
        let url = format!("{}/simple/", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, SIMPLE_JSON)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::RegistryError(format!("{} returned {}", url, status)));
        }
        Ok(response.json().await?)
    }

    /// Best fuzzy matches for `query`, at most [`SEARCH_LIMIT`]
    pub fn search(&self, query: &str) -> Vec<PypiProject> {
        let projects = self.projects.read().unwrap_or_else(PoisonError::into_inner);
        search_projects(&projects, query)
    }

    fn replace(&self, projects: Vec<PypiProject>) {
        *self.projects.write().unwrap_or_else(PoisonError::into_inner) = projects;
    }

    fn cache_file(&self) -> Option<PathBuf> {
        self.cache_dir.as_deref().map(|dir| dir.join(CACHE_FILE))
    }

    fn write_cache(&self, simple: &PypiSimple) -> Result<()> {
        let Some(path) = self.cache_file() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string(simple)?)?;
        Ok(())
    }
}

fn read_cache(path: &Path) -> Option<PypiSimple> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(simple) => Some(simple),
        Err(e) => {
            debug!("Ignoring unreadable PyPI cache {}: {}", path.display(), e);
            None
        }
    }
}

fn search_projects(projects: &[PypiProject], query: &str) -> Vec<PypiProject> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &PypiProject)> = projects
        .iter()
        .filter_map(|project| {
            matcher
                .fuzzy_match(&project.name, query)
                .map(|score| (score, project))
        })
        .collect();
    // higher score first, shorter names break ties
    scored.sort_by(|(a, pa), (b, pb)| b.cmp(a).then(pa.name.len().cmp(&pb.name.len())));

    scored
        .into_iter()
        .take(SEARCH_LIMIT)
        .map(|(_, project)| project.clone())
        .collect()
}
