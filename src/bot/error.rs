use thiserror::Error;

use crate::chat::ChatError;
use crate::rooms::RoomError;
use crate::version::error::CacheError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("Room registry error: {0}")]
    Rooms(#[from] RoomError),
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Version cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Room registry error: {0}")]
    Rooms(#[from] RoomError),
}
