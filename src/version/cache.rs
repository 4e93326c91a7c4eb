//! Last-notified version per platform, persisted as a single JSON object

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::version::error::CacheError;
use crate::version::feed::VersionFeed;
use crate::version::types::VersionMap;

pub struct VersionCache {
    path: PathBuf,
    feed: Arc<dyn VersionFeed>,
    lock: Mutex<()>,
}

impl VersionCache {
    pub fn new(path: impl Into<PathBuf>, feed: Arc<dyn VersionFeed>) -> Self {
        Self {
            path: path.into(),
            feed,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached versions.
    ///
    /// When nothing has been cached yet the feed is fetched once, the result
    /// persisted, and returned. A corrupt file is reseeded the same way.
    pub async fn read(&self) -> Result<VersionMap, CacheError> {
        let _guard = self.lock.lock().await;

        if let Some(versions) = self.load()? {
            return Ok(versions);
        }

        info!("Seeding version cache at {:?} from the feed", self.path);
        let versions = self.feed.fetch_latest().await?;
        self.save(&versions)?;
        Ok(versions)
    }

    /// Replaces the cached versions. The file is synced before returning.
    pub async fn write(&self, versions: &VersionMap) -> Result<(), CacheError> {
        let _guard = self.lock.lock().await;
        self.save(versions)
    }

    fn load(&self) -> Result<Option<VersionMap>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<VersionMap>(&content) {
            Ok(versions) if versions.is_empty() => {
                warn!("Version cache at {:?} is empty, reseeding", self.path);
                Ok(None)
            }
            Ok(versions) => Ok(Some(versions)),
            Err(e) => {
                warn!(
                    "Ignoring malformed version cache at {:?}: {}",
                    self.path, e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, versions: &VersionMap) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(versions)?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        debug!("Wrote {} versions to {:?}", versions.len(), self.path);
        Ok(())
    }
}
