use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::{Channel, PackageHit, Registry, queries};
use crate::{
    config::Config,
    error::{Error, Result},
};
use async_trait::async_trait;

pub const PREFIX_GRAPHQL_URL: &str = "https://prefix.dev/api/graphql";

/// GraphQL client for the prefix.dev channel registry
#[derive(Debug, Clone)]
pub struct PrefixClient {
    url: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChannelsData {
    channels: ChannelPage,
}

#[derive(Debug, Deserialize)]
struct ChannelPage {
    #[serde(default)]
    pages: u32,
    #[serde(default)]
    page: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct PackagesData {
    packages: PackagePage,
}

#[derive(Debug, Deserialize)]
struct PackagePage {
    #[serde(default)]
    page: Vec<RawPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackage {
    name: String,
    summary: Option<String>,
    latest_version: Option<VersionRef>,
    channel: Option<ChannelRef>,
}

#[derive(Debug, Deserialize)]
struct VersionRef {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ChannelRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PackageData {
    package: Option<LatestVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestVersion {
    latest_version: Option<VersionRef>,
}

impl PrefixClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_url(PREFIX_GRAPHQL_URL, api_key)
    }

    pub fn with_url(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.prefix_api_key.clone())
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::RegistryError(
                "prefix.dev rejected the API key".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(Error::RegistryError(format!("{}: {}", status, body)));
        }
        parse_response(&body)
    }

    /// Every channel visible to the key, across all result pages
    pub async fn channels(&self) -> Result<Vec<Channel>> {
        let first: ChannelsData = self.query(queries::GET_USER_CHANNELS, json!({ "page": 0 })).await?;
        let pages = first.channels.pages;
        let mut channels = first.channels.page;

        for page in 1..pages {
            let next: ChannelsData = self
                .query(queries::GET_USER_CHANNELS, json!({ "page": page }))
                .await?;
            channels.extend(next.channels.page);
        }
        debug!("Fetched {} channel(s) over {} page(s)", channels.len(), pages);
        Ok(channels)
    }

    /// Packages whose names resemble `name`, most similar first
    pub async fn search_packages(&self, name: &str) -> Result<Vec<PackageHit>> {
        let data: PackagesData = self
            .query(queries::FIND_PACKAGES, json!({ "packageName": name }))
            .await?;
        Ok(data.packages.page.into_iter().map(PackageHit::from).collect())
    }

    pub async fn latest_version(&self, channel: &str, package: &str) -> Result<Option<String>> {
        let data: PackageData = self
            .query(
                queries::GET_PACKAGE_LATEST_VERSION,
                json!({ "channelName": channel, "packageName": package }),
            )
            .await?;
        Ok(data
            .package
            .and_then(|p| p.latest_version)
            .map(|v| v.version))
    }
}

impl From<RawPackage> for PackageHit {
    fn from(raw: RawPackage) -> Self {
        PackageHit {
            name: raw.name,
            channel: raw.channel.map(|c| c.name).unwrap_or_default(),
            summary: raw.summary,
            version: raw.latest_version.map(|v| v.version),
        }
    }
}

fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let response: GraphqlResponse<T> = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(Error::RegistryError(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| Error::RegistryError("response carried no data".to_string()))
}

#[async_trait]
impl Registry for PrefixClient {
    async fn channels(&self) -> Result<Vec<Channel>> {
        PrefixClient::channels(self).await
    }

    async fn search_packages(&self, query: &str) -> Result<Vec<PackageHit>> {
        PrefixClient::search_packages(self, query).await
    }
}
