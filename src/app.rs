//! Process wiring: builds every dependency once and runs the bot until Ctrl-C

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::bot::dispatcher::EventDispatcher;
use crate::bot::listener;
use crate::bot::watcher::VersionWatcher;
use crate::chat::ChatClient;
use crate::chat::webex::WebexClient;
use crate::chat::webhooks::register_webhook;
use crate::config::{BotConfig, access_token};
use crate::rooms::RoomRegistry;
use crate::version::cache::VersionCache;
use crate::version::feed::VersionFeed;
use crate::version::feeds::WebexDesktopFeed;

/// Runs the webhook listener and the version watcher until shutdown
pub async fn run(config: BotConfig) -> anyhow::Result<()> {
    config.validate()?;
    let token = access_token()?;

    let data_dir = config.resolved_data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {data_dir:?}"))?;

    let chat: Arc<dyn ChatClient> = Arc::new(WebexClient::new(&config.api_base_url, &token)?);
    let feed: Arc<dyn VersionFeed> = Arc::new(WebexDesktopFeed::new(config.feed.endpoints())?);
    let rooms = Arc::new(
        RoomRegistry::new(&config.rooms_db_path()).context("Failed to open room registry")?,
    );
    let cache = Arc::new(VersionCache::new(config.version_cache_path(), feed.clone()));

    register_webhook(chat.as_ref(), &config.bot_name, &config.webhook_target_url())
        .await
        .context("Failed to register webhook")?;
    log_rooms(chat.as_ref()).await;

    let watcher = Arc::new(VersionWatcher::new(
        feed.clone(),
        cache,
        rooms.clone(),
        chat.clone(),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let interval = Duration::from_secs(config.poll.interval_secs.max(1));
    let watcher_task = tokio::spawn(watcher.run(interval, shutdown_rx));

    let dispatcher = Arc::new(EventDispatcher::new(
        chat,
        rooms,
        feed,
        config.bot_email.clone(),
    ));
    let listener = TcpListener::bind((config.webhook.bind_address.as_str(), config.webhook.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.webhook.bind_address, config.webhook.port
            )
        })?;

    let served = listener::serve(
        listener,
        listener::router(&config.bot_name, dispatcher),
        shutdown_signal(),
    )
    .await;

    let _ = shutdown_tx.send(true);
    watcher_task.await.context("Version watcher panicked")?;
    info!("Notifier stopped");

    served.context("Webhook listener failed")
}

/// Prints the live feed once, without touching any stored state
pub async fn print_versions(config: &BotConfig) -> anyhow::Result<()> {
    let feed = WebexDesktopFeed::new(config.feed.endpoints())?;
    let versions = feed.fetch_latest().await?;
    for line in crate::bot::messages::latest_version_lines(&versions) {
        println!("{line}");
    }
    Ok(())
}

async fn log_rooms(chat: &dyn ChatClient) {
    match chat.list_rooms().await {
        Ok(rooms) => {
            for room in rooms {
                info!("Bot is a member of {} ({})", room.title, room.id);
            }
        }
        Err(e) => warn!("Failed to list rooms: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
