//! Outbound chat platform layer
//!
//! - [`client`]: `ChatClient` trait and the platform resource types
//! - [`webex`]: Webex REST API implementation
//! - [`webhooks`]: Webhook registration at startup
//! - [`error`]: Error types for chat operations

pub mod client;
pub mod error;
pub mod webex;
pub mod webhooks;

pub use client::{ChatClient, Message, NewWebhook, Room, Webhook};
pub use error::ChatError;
