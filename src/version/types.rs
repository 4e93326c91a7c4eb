use indexmap::IndexMap;

/// Released version per platform, in the order the feed reports them
pub type VersionMap = IndexMap<String, String>;

/// A platform whose released version moved past the cached one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub platform: String,
    pub version: String,
}

impl VersionChange {
    pub fn new(platform: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            version: version.into(),
        }
    }
}
