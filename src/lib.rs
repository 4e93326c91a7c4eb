pub mod app;
pub mod bot;
pub mod chat;
pub mod config;
pub mod logging;
pub mod rooms;
pub mod version;
