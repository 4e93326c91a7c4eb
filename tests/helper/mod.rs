//! Test utilities shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use webex_update_notifier::chat::{ChatClient, ChatError, Message, NewWebhook, Room, Webhook};
use webex_update_notifier::rooms::{RoomRegistry, RoomType};
use webex_update_notifier::version::cache::VersionCache;
use webex_update_notifier::version::error::FeedError;
use webex_update_notifier::version::feed::VersionFeed;
use webex_update_notifier::version::types::VersionMap;

pub const BOT_EMAIL: &str = "notifier@webex.bot";

pub fn versions(entries: &[(&str, &str)]) -> VersionMap {
    entries
        .iter()
        .map(|(p, v)| (p.to_string(), v.to_string()))
        .collect()
}

/// Chat platform fake: serves rooms and messages from memory and records
/// every posted message
#[derive(Default)]
pub struct FakeChat {
    rooms: Mutex<HashMap<String, Room>>,
    messages: Mutex<HashMap<String, String>>,
    failing_rooms: Mutex<Vec<String>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(self, id: &str, title: &str, room_type: RoomType) -> Self {
        self.rooms.lock().unwrap().insert(
            id.to_string(),
            Room {
                id: id.to_string(),
                title: title.to_string(),
                room_type,
            },
        );
        self
    }

    pub fn with_message(self, id: &str, text: &str) -> Self {
        self.messages
            .lock()
            .unwrap()
            .insert(id.to_string(), text.to_string());
        self
    }

    /// Makes every post to `room_id` fail
    pub fn failing_for(self, room_id: &str) -> Self {
        self.failing_rooms.lock().unwrap().push(room_id.to_string());
        self
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, room_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(room, _)| room == room_id)
            .map(|(_, body)| body)
            .collect()
    }
}

#[async_trait]
impl ChatClient for FakeChat {
    async fn create_message(&self, room_id: &str, markdown: &str) -> Result<(), ChatError> {
        if self.failing_rooms.lock().unwrap().iter().any(|r| r == room_id) {
            return Err(ChatError::Status {
                status: 403,
                body: "not a member".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((room_id.to_string(), markdown.to_string()));
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> Result<Room, ChatError> {
        self.rooms
            .lock()
            .unwrap()
            .get(room_id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(room_id.to_string()))
    }

    async fn get_message(&self, message_id: &str) -> Result<Message, ChatError> {
        let text = self
            .messages
            .lock()
            .unwrap()
            .get(message_id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(message_id.to_string()))?;
        Ok(Message {
            id: message_id.to_string(),
            room_id: String::new(),
            text: Some(text),
            person_email: None,
        })
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, ChatError> {
        Ok(self.rooms.lock().unwrap().values().cloned().collect())
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>, ChatError> {
        Ok(Vec::new())
    }

    async fn create_webhook(&self, webhook: &NewWebhook) -> Result<Webhook, ChatError> {
        Ok(Webhook {
            id: "wh-1".to_string(),
            name: webhook.name.clone(),
            target_url: webhook.target_url.clone(),
            resource: webhook.resource.clone(),
            event: webhook.event.clone(),
        })
    }

    async fn delete_webhook(&self, _webhook_id: &str) -> Result<(), ChatError> {
        Ok(())
    }
}

/// Feed fake returning whatever was last set, or an error when unset
#[derive(Default)]
pub struct FakeFeed {
    current: Mutex<Option<VersionMap>>,
    calls: Mutex<usize>,
}

impl FakeFeed {
    pub fn new(initial: &[(&str, &str)]) -> Self {
        let feed = Self::default();
        feed.set(initial);
        feed
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, entries: &[(&str, &str)]) {
        *self.current.lock().unwrap() = Some(versions(entries));
    }

    pub fn go_down(&self) {
        *self.current.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl VersionFeed for FakeFeed {
    async fn fetch_latest(&self) -> Result<VersionMap, FeedError> {
        *self.calls.lock().unwrap() += 1;
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FeedError::InvalidResponse {
                url: "fake://feed".to_string(),
                reason: "feed is down".to_string(),
            })
    }
}

/// Stores backed by a temporary directory
pub struct TestStores {
    pub temp_dir: TempDir,
    pub rooms: Arc<RoomRegistry>,
    pub cache: Arc<VersionCache>,
}

pub fn create_test_stores(feed: Arc<FakeFeed>) -> TestStores {
    let temp_dir = TempDir::new().unwrap();
    let rooms = Arc::new(RoomRegistry::new(&temp_dir.path().join("rooms.db")).unwrap());
    let cache = Arc::new(VersionCache::new(
        temp_dir.path().join("versions.json"),
        feed,
    ));
    TestStores {
        temp_dir,
        rooms,
        cache,
    }
}
