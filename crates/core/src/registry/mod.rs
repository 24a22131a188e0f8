//! Channel and package lookup against prefix.dev and PyPI

mod prefix;
mod pypi;
pub mod queries;

pub use prefix::{PREFIX_GRAPHQL_URL, PrefixClient};
pub use pypi::{MIN_QUERY_LEN, PYPI_URL, PypiIndex, PypiProject, PypiSimple, SEARCH_LIMIT};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A conda channel known to prefix.dev
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base_url: String,
    /// Empty for public channels
    #[serde(default)]
    pub owner: Option<String>,
}

impl Channel {
    /// What to hand to `pixi`: owned channels are addressed by URL
    pub fn reference(&self) -> &str {
        match self.owner.as_deref() {
            Some(owner) if !owner.is_empty() && !self.base_url.is_empty() => &self.base_url,
            _ => &self.name,
        }
    }
}

/// One package search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageHit {
    pub name: String,
    pub channel: String,
    pub summary: Option<String>,
    pub version: Option<String>,
}

/// Channel and package lookup used by the interactive flows
#[async_trait]
pub trait Registry: Send + Sync {
    async fn channels(&self) -> Result<Vec<Channel>>;

    async fn search_packages(&self, query: &str) -> Result<Vec<PackageHit>>;
}
