//! Chat client trait for talking to the chat platform

#[cfg(test)]
use mockall::automock;

use serde::{Deserialize, Serialize};

use crate::chat::error::ChatError;
use crate::rooms::RoomType;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub room_id: String,
    /// Plain-text body; absent for file-only messages
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub person_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub target_url: String,
    pub resource: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    pub name: String,
    pub target_url: String,
    pub resource: String,
    pub event: String,
}

/// Operations the bot needs from the chat platform
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Posts a markdown message to a room
    async fn create_message(&self, room_id: &str, markdown: &str) -> Result<(), ChatError>;

    async fn get_room(&self, room_id: &str) -> Result<Room, ChatError>;

    async fn get_message(&self, message_id: &str) -> Result<Message, ChatError>;

    /// Lists the rooms the bot is a member of
    async fn list_rooms(&self) -> Result<Vec<Room>, ChatError>;

    /// Lists the webhooks registered with the bot's token
    async fn list_webhooks(&self) -> Result<Vec<Webhook>, ChatError>;

    async fn create_webhook(&self, webhook: &NewWebhook) -> Result<Webhook, ChatError>;

    async fn delete_webhook(&self, webhook_id: &str) -> Result<(), ChatError>;
}
