//! Periodic version check: fetch, diff against the cache, notify subscribers

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::bot::error::WatchError;
use crate::bot::messages::update_notification;
use crate::chat::ChatClient;
use crate::config::NOTIFY_CONCURRENCY;
use crate::rooms::{RoomRecord, RoomRegistry};
use crate::version::cache::VersionCache;
use crate::version::diff::detect_changes;
use crate::version::feed::VersionFeed;
use crate::version::types::VersionChange;

/// Result of one version check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A previous check was still running
    Skipped,
    /// The feed could not be fetched; retried on the next tick
    FeedUnavailable,
    Unchanged,
    Notified(NotifyReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyReport {
    pub changes: Vec<VersionChange>,
    pub delivered: usize,
    pub failed: usize,
    /// False when the new versions could not be persisted; the same change
    /// is then announced again on the next tick
    pub cache_written: bool,
}

pub struct VersionWatcher {
    feed: Arc<dyn VersionFeed>,
    cache: Arc<VersionCache>,
    rooms: Arc<RoomRegistry>,
    chat: Arc<dyn ChatClient>,
    in_flight: Mutex<()>,
}

impl VersionWatcher {
    pub fn new(
        feed: Arc<dyn VersionFeed>,
        cache: Arc<VersionCache>,
        rooms: Arc<RoomRegistry>,
        chat: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            feed,
            cache,
            rooms,
            chat,
            in_flight: Mutex::new(()),
        }
    }

    /// Runs one version check.
    ///
    /// Only one check runs at a time; a call made while another is in
    /// progress returns `TickOutcome::Skipped` without doing anything.
    pub async fn tick(&self) -> Result<TickOutcome, WatchError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            info!("Previous version check still running, skipping");
            return Ok(TickOutcome::Skipped);
        };

        let latest = match self.feed.fetch_latest().await {
            Ok(latest) => latest,
            Err(e) => {
                warn!("Version feed unavailable, skipping this check: {}", e);
                return Ok(TickOutcome::FeedUnavailable);
            }
        };

        let previous = self.cache.read().await?;
        let changes = detect_changes(&previous, &latest);

        if changes.is_empty() {
            debug!("No new versions: {:?}", latest);
            return Ok(TickOutcome::Unchanged);
        }

        for change in &changes {
            info!(
                "New version for {}: {} (was {})",
                change.platform,
                change.version,
                previous
                    .get(&change.platform)
                    .map(String::as_str)
                    .unwrap_or("unknown")
            );
        }

        let message = update_notification(&changes);
        let subscribers = self.rooms.list_subscribed()?;
        let (delivered, failed) = self.notify_rooms(subscribers, &message).await;
        info!(
            "Announced new versions to {} rooms ({} failed)",
            delivered, failed
        );

        // Persist the whole feed, not only the changed platforms
        let cache_written = self
            .cache
            .write(&latest)
            .await
            .inspect_err(|e| {
                error!(
                    "Failed to write version cache {:?}, the change will be announced again: {}",
                    self.cache.path(),
                    e
                )
            })
            .is_ok();

        Ok(TickOutcome::Notified(NotifyReport {
            changes,
            delivered,
            failed,
            cache_written,
        }))
    }

    /// Sends `message` to every room with bounded parallelism.
    /// Failures are logged per room and never stop the other sends.
    async fn notify_rooms(&self, rooms: Vec<RoomRecord>, message: &str) -> (usize, usize) {
        let message: Arc<str> = Arc::from(message);
        let results: Vec<bool> = stream::iter(rooms)
            .map(|room| {
                let chat = Arc::clone(&self.chat);
                let message = Arc::clone(&message);
                async move {
                    chat.create_message(&room.room_id, &message)
                        .await
                        .inspect_err(|e| {
                            error!(
                                "Failed to notify room {} ({}): {}",
                                room.room_title, room.room_id, e
                            )
                        })
                        .is_ok()
                }
            })
            .buffer_unordered(NOTIFY_CONCURRENCY)
            .collect()
            .await;

        let delivered = results.iter().filter(|ok| **ok).count();
        (delivered, results.len() - delivered)
    }

    /// Checks for new versions every `interval` until `shutdown` fires.
    ///
    /// Ticks never overlap: a check that overruns the interval delays the
    /// next one instead of running alongside it. Failed checks are logged
    /// and the loop keeps going. Shutdown is only observed between checks.
    pub async fn run(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Checking for new versions every {:?}", interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(outcome) => debug!("Version check finished: {:?}", outcome),
                        Err(e) => error!("Version check failed: {}", e),
                    }
                }
                _ = shutdown.changed() => {
                    info!("Version watcher stopped");
                    break;
                }
            }
        }
    }
}
