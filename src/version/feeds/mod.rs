//! Feed implementations for fetching released versions

pub mod webex;

pub use webex::WebexDesktopFeed;
