//! Inbound webhook payloads

use serde::Deserialize;
use tracing::warn;

use crate::rooms::RoomType;

/// Webhook delivery as posted by the chat platform. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub resource: String,
    pub event: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventData {
    /// Id of the resource the event is about (message id for messages)
    pub id: Option<String>,
    pub room_id: Option<String>,
    pub room_type: Option<String>,
    pub person_email: Option<String>,
}

/// Events the bot reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    MembershipCreated {
        room_id: String,
        room_type: Option<RoomType>,
    },
    MembershipDeleted {
        room_id: String,
    },
    MessageCreated {
        message_id: String,
        room_id: String,
        room_type: Option<RoomType>,
        person_email: String,
    },
}

impl WebhookEvent {
    /// Maps the delivery to a `BotEvent`, or `None` for combinations the bot
    /// does not handle and payloads missing a required field
    pub fn classify(&self) -> Option<BotEvent> {
        let data = &self.data;
        match (self.resource.as_str(), self.event.as_str()) {
            ("memberships", "created") => Some(BotEvent::MembershipCreated {
                room_id: data.room_id.clone()?,
                room_type: data.parsed_room_type(),
            }),
            ("memberships", "deleted") => Some(BotEvent::MembershipDeleted {
                room_id: data.room_id.clone()?,
            }),
            ("messages", "created") => Some(BotEvent::MessageCreated {
                message_id: data.id.clone()?,
                room_id: data.room_id.clone()?,
                room_type: data.parsed_room_type(),
                person_email: data.person_email.clone().unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

impl EventData {
    fn parsed_room_type(&self) -> Option<RoomType> {
        let raw = self.room_type.as_deref()?;
        raw.parse()
            .inspect_err(|e| warn!("Ignoring room type in webhook payload: {}", e))
            .ok()
    }
}
