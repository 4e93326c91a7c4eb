//! HTTP listener receiving webhook deliveries from the chat platform

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::bot::dispatcher::EventDispatcher;
use crate::bot::events::WebhookEvent;

/// Builds the router serving `POST /{bot_name}`
pub fn router(bot_name: &str, dispatcher: Arc<EventDispatcher>) -> Router {
    Router::new()
        .route(&format!("/{bot_name}"), post(receive_webhook))
        .with_state(dispatcher)
}

/// Acknowledges every well-formed delivery. Handling errors are only logged:
/// the platform cannot act on them.
async fn receive_webhook(
    State(dispatcher): State<Arc<EventDispatcher>>,
    Json(event): Json<WebhookEvent>,
) -> StatusCode {
    if let Err(e) = dispatcher.dispatch(&event).await {
        error!(
            "Failed to handle {}/{} event for room {}: {}",
            event.resource,
            event.event,
            event.data.room_id.as_deref().unwrap_or("unknown"),
            e
        );
    }
    StatusCode::OK
}

/// Serves `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening for webhooks on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
