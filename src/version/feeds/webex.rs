//! Webex desktop client upgrade feed implementation

use std::time::Duration;

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::HTTP_TIMEOUT_MS;
use crate::version::error::FeedError;
use crate::version::feed::VersionFeed;
use crate::version::types::VersionMap;

/// Upgrade manifest of the Windows gold channel
pub const DEFAULT_WINDOWS_URL: &str = "https://7f3b835a2983943a12b7-f3ec652549fc8fa11516a139bfb29b79.ssl.cf5.rackcdn.com/WebexTeamsDesktop-Windows-Gold/webexteams_upgrade.txt";

/// Upgrade manifest of the macOS gold channel
pub const DEFAULT_MAC_URL: &str = "https://7f3b835a2983943a12b7-f3ec652549fc8fa11516a139bfb29b79.ssl.cf5.rackcdn.com/WebexTeamsDesktop-OSX-Gold/webexteams_upgrade.txt";

/// Body of an upgrade manifest. Served as `text/plain`, so it is parsed by hand.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeManifest {
    version_info: VersionInfo,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    platform: String,
    version: String,
}

/// Feed implementation reading the per-platform upgrade manifests
pub struct WebexDesktopFeed {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl WebexDesktopFeed {
    /// Creates a feed reading the given manifest URLs, in order
    pub fn new(endpoints: Vec<String>) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent("webex-update-notifier")
            .timeout(Duration::from_millis(HTTP_TIMEOUT_MS))
            .build()?;

        Ok(Self { client, endpoints })
    }

    async fn fetch_manifest(&self, url: &str) -> Result<VersionInfo, FeedError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Version feed returned status {}: {}", status, url);
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let manifest: UpgradeManifest = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse version feed response from {}: {}", url, e);
            FeedError::InvalidResponse {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!(
            "Feed {} reports {} {}",
            url, manifest.version_info.platform, manifest.version_info.version
        );
        Ok(manifest.version_info)
    }
}

#[async_trait::async_trait]
impl VersionFeed for WebexDesktopFeed {
    async fn fetch_latest(&self) -> Result<VersionMap, FeedError> {
        let manifests =
            try_join_all(self.endpoints.iter().map(|url| self.fetch_manifest(url))).await?;

        Ok(manifests
            .into_iter()
            .map(|info| (info.platform, info.version))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn manifest(platform: &str, version: &str) -> String {
        format!(r#"{{"versionInfo": {{"platform": "{platform}", "version": "{version}", "mandatory": false}}}}"#)
    }

    #[tokio::test]
    async fn fetch_latest_returns_version_per_platform_in_endpoint_order() {
        let mut server = Server::new_async().await;

        let windows = server
            .mock("GET", "/windows/webexteams_upgrade.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(manifest("Windows", "41.2.0.100"))
            .create_async()
            .await;
        let mac = server
            .mock("GET", "/mac/webexteams_upgrade.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(manifest("Mac", "41.2.0.101"))
            .create_async()
            .await;

        let feed = WebexDesktopFeed::new(vec![
            format!("{}/windows/webexteams_upgrade.txt", server.url()),
            format!("{}/mac/webexteams_upgrade.txt", server.url()),
        ])
        .unwrap();
        let result = feed.fetch_latest().await.unwrap();

        windows.assert_async().await;
        mac.assert_async().await;
        assert_eq!(
            result.into_iter().collect::<Vec<_>>(),
            vec![
                ("Windows".to_string(), "41.2.0.100".to_string()),
                ("Mac".to_string(), "41.2.0.101".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_latest_fails_when_one_endpoint_returns_error_status() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/windows")
            .with_status(200)
            .with_body(manifest("Windows", "41.2.0.100"))
            .create_async()
            .await;
        server
            .mock("GET", "/mac")
            .with_status(503)
            .create_async()
            .await;

        let feed = WebexDesktopFeed::new(vec![
            format!("{}/windows", server.url()),
            format!("{}/mac", server.url()),
        ])
        .unwrap();
        let result = feed.fetch_latest().await;

        assert!(matches!(result, Err(FeedError::Status { status: 503, .. })));
    }

    #[tokio::test]
    async fn fetch_latest_fails_when_version_key_is_missing() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/windows")
            .with_status(200)
            .with_body(r#"{"versionInfo": {"platform": "Windows"}}"#)
            .create_async()
            .await;

        let feed = WebexDesktopFeed::new(vec![format!("{}/windows", server.url())]).unwrap();
        let result = feed.fetch_latest().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FeedError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn fetch_latest_fails_on_non_json_body() {
        let mut server = Server::new_async().await;

        server
            .mock("GET", "/windows")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let feed = WebexDesktopFeed::new(vec![format!("{}/windows", server.url())]).unwrap();
        let result = feed.fetch_latest().await;

        assert!(matches!(result, Err(FeedError::InvalidResponse { .. })));
    }
}
