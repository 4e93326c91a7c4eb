//! Webex REST API chat client implementation

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::chat::client::{ChatClient, Message, NewWebhook, Room, Webhook};
use crate::chat::error::ChatError;
use crate::config::HTTP_TIMEOUT_MS;

/// Default base URL for the Webex API
pub const DEFAULT_BASE_URL: &str = "https://webexapis.com/v1";

/// Page size requested from list endpoints; further pages follow the `Link` header
const PAGE_SIZE: &str = "100";

/// Envelope of Webex list endpoints
#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    items: Vec<T>,
}

/// Chat client talking to the Webex REST API with a bot access token
pub struct WebexClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl WebexClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .user_agent("webex-update-notifier")
            .timeout(Duration::from_millis(HTTP_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends the request and maps non-success statuses to `ChatError`
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<reqwest::Response, ChatError> {
        let response = request.bearer_auth(&self.access_token).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ChatError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Webex API returned status {} for {}", status, resource);
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<T, ChatError> {
        let response = self.send(request, resource).await?;
        parse_json(response, resource).await
    }

    /// Collects every page of a list endpoint
    async fn list_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ChatError> {
        let mut items = Vec::new();
        let mut request = self.client.get(self.url(path)).query(&[("max", PAGE_SIZE)]);

        loop {
            let response = self.send(request, path).await?;
            let next = next_page_url(response.headers());
            let page: ItemsResponse<T> = parse_json(response, path).await?;
            items.extend(page.items);

            match next {
                Some(url) => {
                    debug!("Fetching next page of {}: {}", path, url);
                    request = self.client.get(url);
                }
                None => return Ok(items),
            }
        }
    }
}

async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
    resource: &str,
) -> Result<T, ChatError> {
    response.json().await.map_err(|e| {
        warn!("Failed to parse Webex response for {}: {}", resource, e);
        ChatError::InvalidResponse(e.to_string())
    })
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header
fn next_page_url(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        params
            .split(';')
            .any(|param| param.trim() == r#"rel="next""#)
            .then(|| {
                target
                    .trim()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string()
            })
    })
}

#[async_trait::async_trait]
impl ChatClient for WebexClient {
    async fn create_message(&self, room_id: &str, markdown: &str) -> Result<(), ChatError> {
        let request = self
            .client
            .post(self.url("messages"))
            .json(&json!({ "roomId": room_id, "markdown": markdown }));

        self.send(request, &format!("room {room_id}")).await?;
        debug!("Posted message to room {}", room_id);
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> Result<Room, ChatError> {
        let request = self.client.get(self.url(&format!("rooms/{room_id}")));
        self.send_json(request, &format!("room {room_id}")).await
    }

    async fn get_message(&self, message_id: &str) -> Result<Message, ChatError> {
        let request = self.client.get(self.url(&format!("messages/{message_id}")));
        self.send_json(request, &format!("message {message_id}")).await
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, ChatError> {
        self.list_all("rooms").await
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>, ChatError> {
        self.list_all("webhooks").await
    }

    async fn create_webhook(&self, webhook: &NewWebhook) -> Result<Webhook, ChatError> {
        let request = self.client.post(self.url("webhooks")).json(webhook);
        self.send_json(request, "webhooks").await
    }

    async fn delete_webhook(&self, webhook_id: &str) -> Result<(), ChatError> {
        let request = self
            .client
            .delete(self.url(&format!("webhooks/{webhook_id}")));
        self.send(request, &format!("webhook {webhook_id}")).await?;
        Ok(())
    }
}
