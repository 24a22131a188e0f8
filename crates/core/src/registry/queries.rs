//! GraphQL documents sent to the prefix.dev API

pub const GET_PACKAGE_LATEST_VERSION: &str = r#"
query GetPackageLatestVersion($channelName: String!, $packageName: String!) {
  package(channelName: $channelName, name: $packageName) {
    latestVersion {
      version
    }
  }
}
"#;

pub const FIND_PACKAGES: &str = r#"
query findPackages($packageName: String!, $limit: Int = 20) {
  packages(limit: $limit, orderBy: { bySimilarity: { field: NAME, matches: $packageName } }) {
    page {
      name
      summary
      latestVersion {
        version
      }
      channel {
        name
      }
    }
  }
}
"#;

pub const GET_USER_CHANNELS: &str = r#"
query GetUserChannels($page: Int) {
  channels(page: $page) {
    pages
    page {
      name
      description
      baseUrl
      owner
    }
  }
}
"#;
