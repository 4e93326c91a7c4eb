//! Feed trait for fetching the currently released client versions

#[cfg(test)]
use mockall::automock;

use crate::version::error::FeedError;
use crate::version::types::VersionMap;

/// Trait for fetching the released version of every tracked platform
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionFeed: Send + Sync {
    /// Fetches the latest released version for each platform
    ///
    /// # Returns
    /// * `Ok(VersionMap)` - Platform name mapped to its released version
    /// * `Err(FeedError)` - If any endpoint is unreachable or returns a malformed payload
    async fn fetch_latest(&self) -> Result<VersionMap, FeedError>;
}
