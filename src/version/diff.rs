//! Version change detection between the cache and the feed

use crate::version::types::{VersionChange, VersionMap};

/// Returns true if `latest` is a newer release than `previous`.
///
/// Versions are compared as plain strings, exactly as the feed reports them.
/// This only orders correctly while every component keeps the same width:
/// "3.10" sorts before "3.9".
pub fn is_newer(latest: &str, previous: &str) -> bool {
    latest > previous
}

/// Lists the platforms whose latest version is newer than the cached one.
///
/// Platforms missing from `previous` are never reported; the cache picks
/// them up the next time it is written.
pub fn detect_changes(previous: &VersionMap, latest: &VersionMap) -> Vec<VersionChange> {
    latest
        .iter()
        .filter(|(platform, version)| {
            previous
                .get(*platform)
                .is_some_and(|cached| is_newer(version, cached))
        })
        .map(|(platform, version)| VersionChange::new(platform, version))
        .collect()
}
