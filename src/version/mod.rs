//! Version tracking layer for the desktop client releases
//!
//! This module fetches the released versions, remembers the last ones
//! subscribers were told about, and works out what changed in between.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Feed     │────▶│    Cache    │◀────│    Diff     │
//! │  (fetch)    │     │  (storage)  │     │  (compare)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │    Feeds    │
//! │   (webex)   │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: JSON file holding the last notified version per platform
//! - [`diff`]: Version comparison and change detection
//! - [`feed`]: Feed trait for fetching released versions
//! - [`feeds`]: Concrete feed implementations
//! - [`error`]: Error types for feed and cache operations
//! - [`types`]: Common types like `VersionMap`

pub mod cache;
pub mod diff;
pub mod error;
pub mod feed;
pub mod feeds;
pub mod types;
