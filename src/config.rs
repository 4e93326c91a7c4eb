use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::chat::webex::DEFAULT_BASE_URL;
use crate::version::feeds::webex::{DEFAULT_MAC_URL, DEFAULT_WINDOWS_URL};

// =============================================================================
// Time-related constants
// =============================================================================

/// Default interval between version checks in seconds (1 minute)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Timeout for every outbound HTTP call in milliseconds (30 seconds)
pub const HTTP_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of rooms notified concurrently within one check
pub const NOTIFY_CONCURRENCY: usize = 8;

/// Default port of the webhook listener
pub const DEFAULT_WEBHOOK_PORT: u16 = 5000;

/// Environment variable holding the bot access token
pub const ACCESS_TOKEN_ENV: &str = "WEBEX_TEAMS_TOKEN";

const APP_NAME: &str = "webex-update-notifier";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Bot configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BotConfig {
    /// Email of the bot account; messages from it are ignored
    pub bot_email: String,
    /// Webhook name, also the path the listener serves
    pub bot_name: String,
    pub api_base_url: String,
    /// Overrides the XDG data directory
    pub data_dir: Option<PathBuf>,
    pub webhook: WebhookConfig,
    pub feed: FeedConfig,
    pub poll: PollConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_email: String::new(),
            bot_name: String::new(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: None,
            webhook: WebhookConfig::default(),
            feed: FeedConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

/// Webhook listener configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Public base URL the chat platform posts to, without port
    pub listener_base_url: String,
    pub bind_address: String,
    pub port: u16,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            listener_base_url: String::new(),
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_WEBHOOK_PORT,
        }
    }
}

/// Version feed endpoints
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedConfig {
    pub windows_url: String,
    pub mac_url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            windows_url: DEFAULT_WINDOWS_URL.to_string(),
            mac_url: DEFAULT_MAC_URL.to_string(),
        }
    }
}

impl FeedConfig {
    pub fn endpoints(&self) -> Vec<String> {
        vec![self.windows_url.clone(), self.mac_url.clone()]
    }
}

/// Version check scheduling
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
    /// Interval between version checks in seconds
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl BotConfig {
    /// Loads the configuration from a JSON file, or the defaults when no
    /// path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the settings the bot cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_email.trim().is_empty() {
            return Err(ConfigError::Missing("botEmail"));
        }
        if self.bot_name.trim().is_empty() {
            return Err(ConfigError::Missing("botName"));
        }
        if self.webhook.listener_base_url.trim().is_empty() {
            return Err(ConfigError::Missing("webhook.listenerBaseUrl"));
        }
        Ok(())
    }

    /// URL the chat platform delivers webhooks to
    pub fn webhook_target_url(&self) -> String {
        format!(
            "{}:{}/{}",
            self.webhook.listener_base_url.trim_end_matches('/'),
            self.webhook.port,
            self.bot_name
        )
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(data_dir)
    }

    /// Returns the path to the room registry database.
    pub fn rooms_db_path(&self) -> PathBuf {
        self.resolved_data_dir().join("rooms.db")
    }

    /// Returns the path to the version cache file.
    pub fn version_cache_path(&self) -> PathBuf {
        self.resolved_data_dir().join("versions.json")
    }
}

/// Reads the bot access token from the environment
pub fn access_token() -> Result<String, ConfigError> {
    std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or(ConfigError::Missing(ACCESS_TOKEN_ENV))
}

/// Returns the path to the data directory for the notifier.
/// Uses $XDG_DATA_HOME/webex-update-notifier if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/webex-update-notifier,
/// or ./webex-update-notifier if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the directory log files are written to.
pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_NAME)
}
