//! Persisted registry of the rooms the bot has been seen in
//!
//! - [`registry`]: SQLite-backed `RoomRegistry`
//! - [`types`]: `RoomRecord` and `RoomType`
//! - [`error`]: Error types for registry operations

pub mod error;
pub mod registry;
pub mod types;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use types::{HelpRequests, RoomRecord, RoomType};
