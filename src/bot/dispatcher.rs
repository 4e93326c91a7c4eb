//! Inbound event handling: keeps the room registry in step with the chat
//! platform and answers commands.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bot::commands::{Command, parse_command};
use crate::bot::error::DispatchError;
use crate::bot::events::{BotEvent, WebhookEvent};
use crate::bot::messages;
use crate::chat::ChatClient;
use crate::rooms::{RoomError, RoomRecord, RoomRegistry, RoomType};
use crate::version::feed::VersionFeed;

pub struct EventDispatcher {
    chat: Arc<dyn ChatClient>,
    rooms: Arc<RoomRegistry>,
    feed: Arc<dyn VersionFeed>,
    bot_email: String,
}

impl EventDispatcher {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        rooms: Arc<RoomRegistry>,
        feed: Arc<dyn VersionFeed>,
        bot_email: impl Into<String>,
    ) -> Self {
        Self {
            chat,
            rooms,
            feed,
            bot_email: bot_email.into(),
        }
    }

    /// Handles one webhook delivery. Unhandled event kinds are ignored.
    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<(), DispatchError> {
        let Some(bot_event) = event.classify() else {
            debug!("Ignoring webhook event {}/{}", event.resource, event.event);
            return Ok(());
        };

        match bot_event {
            BotEvent::MembershipCreated { room_id, room_type } => {
                self.on_membership_created(&room_id, room_type).await
            }
            BotEvent::MembershipDeleted { room_id } => self.on_membership_deleted(&room_id),
            BotEvent::MessageCreated {
                message_id,
                room_id,
                room_type,
                person_email,
            } => {
                self.on_message_created(&message_id, &room_id, room_type, &person_email)
                    .await
            }
        }
    }

    /// Upserts the room using the platform's current title. The payload's
    /// room type wins over the looked-up one when present.
    async fn observe_room(
        &self,
        room_id: &str,
        room_type: Option<RoomType>,
    ) -> Result<RoomRecord, DispatchError> {
        let room = self.chat.get_room(room_id).await?;
        let room_type = room_type.unwrap_or(room.room_type);
        Ok(self
            .rooms
            .upsert_on_observation(room_id, &room.title, room_type)?)
    }

    async fn on_membership_created(
        &self,
        room_id: &str,
        room_type: Option<RoomType>,
    ) -> Result<(), DispatchError> {
        self.observe_room(room_id, room_type).await?;
        let record = self.rooms.set_subscribed(room_id, true)?;

        info!("Welcoming room {} ({})", record.room_title, room_id);
        self.chat
            .create_message(room_id, messages::help_text(record.room_type))
            .await?;
        Ok(())
    }

    fn on_membership_deleted(&self, room_id: &str) -> Result<(), DispatchError> {
        match self.rooms.set_subscribed(room_id, false) {
            Ok(_) => {
                info!("Membership removed, unsubscribed room {}", room_id);
                Ok(())
            }
            Err(RoomError::NotFound(_)) => {
                warn!(
                    "Membership removed for unknown room {}, nothing to unsubscribe",
                    room_id
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn on_message_created(
        &self,
        message_id: &str,
        room_id: &str,
        room_type: Option<RoomType>,
        person_email: &str,
    ) -> Result<(), DispatchError> {
        // The bot's own posts come back as message events too
        if person_email.eq_ignore_ascii_case(&self.bot_email) {
            debug!("Ignoring own message {} in room {}", message_id, room_id);
            return Ok(());
        }

        let record = self.observe_room(room_id, room_type).await?;
        let message = self.chat.get_message(message_id).await?;
        let text = message.text.unwrap_or_default();

        let command = parse_command(&text);
        debug!("Room {} sent {:?}", room_id, command);

        match command {
            Command::Unsubscribe => {
                self.rooms.set_subscribed(room_id, false)?;
                self.chat.create_message(room_id, messages::UNSUBSCRIBED).await?;
            }
            Command::Subscribe => {
                self.rooms.set_subscribed(room_id, true)?;
                self.chat.create_message(room_id, messages::SUBSCRIBED).await?;
            }
            Command::Help => {
                self.chat
                    .create_message(room_id, messages::help_text(record.room_type))
                    .await?;
            }
            Command::Version => self.send_version_summary(room_id).await?,
        }

        Ok(())
    }

    /// Replies with the live feed, one message per platform plus the footer
    async fn send_version_summary(&self, room_id: &str) -> Result<(), DispatchError> {
        let versions = match self.feed.fetch_latest().await {
            Ok(versions) => versions,
            Err(e) => {
                warn!("Version request from room {} failed: {}", room_id, e);
                self.chat
                    .create_message(room_id, messages::FEED_UNAVAILABLE)
                    .await?;
                return Ok(());
            }
        };

        for line in messages::latest_version_lines(&versions) {
            self.chat.create_message(room_id, &line).await?;
        }
        self.chat.create_message(room_id, messages::LEARN_MORE).await?;
        Ok(())
    }
}
