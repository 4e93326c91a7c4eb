//! Bot layer: reacts to chat events and announces new releases
//!
//! # Modules
//!
//! - [`dispatcher`]: Handles membership and message events
//! - [`watcher`]: Periodic version check and subscriber fan-out
//! - [`listener`]: HTTP endpoint receiving webhook deliveries
//! - [`events`]: Webhook payload model
//! - [`commands`]: Keyword command table
//! - [`messages`]: Markdown texts posted by the bot
//! - [`error`]: Error types for dispatching and watching

pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod listener;
pub mod messages;
pub mod watcher;
