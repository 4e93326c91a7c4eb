use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}
