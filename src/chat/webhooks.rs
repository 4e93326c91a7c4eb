//! Webhook registration for the bot's inbound event listener

use tracing::{info, warn};

use crate::chat::client::{ChatClient, NewWebhook, Webhook};
use crate::chat::error::ChatError;

/// Replaces every webhook registered with the bot's token by a single
/// `all`/`all` webhook pointing at `target_url`.
///
/// Webhooks left behind by a previous run would otherwise deliver every
/// event twice. A webhook that fails to delete is logged and skipped.
pub async fn register_webhook(
    chat: &dyn ChatClient,
    name: &str,
    target_url: &str,
) -> Result<Webhook, ChatError> {
    for webhook in chat.list_webhooks().await? {
        match chat.delete_webhook(&webhook.id).await {
            Ok(()) => info!(
                "Deleted stale webhook {} ({} -> {})",
                webhook.name, webhook.id, webhook.target_url
            ),
            Err(e) => warn!("Failed to delete webhook {}: {}", webhook.id, e),
        }
    }

    let webhook = chat
        .create_webhook(&NewWebhook {
            name: name.to_string(),
            target_url: target_url.to_string(),
            resource: "all".to_string(),
            event: "all".to_string(),
        })
        .await?;

    info!(
        "Registered webhook {} ({}) -> {}",
        webhook.name, webhook.id, webhook.target_url
    );
    Ok(webhook)
}
