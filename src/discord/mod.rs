//! # Discord Webhook Delivery
//!
//! This module posts converted messages to a Discord channel through an
//! incoming webhook, and checks webhook URLs before they are stored.
//!
//! ## Features
//!
//! - **One Request per Message**: Each [`DiscordMessage`] is its own POST, in order
//! - **Fail Fast**: The first rejected message stops the rest of the batch
//! - **Rate Limiting**: A fixed pause between sends keeps bursts under Discord's limits
//! - **Verification**: A GET against the webhook confirms it exists and names a channel
//!
//! ## Pacing
//!
//! The converter puts at most one embed in each message, so a batch is one
//! request per message. Sends are spaced by `DISCORD_SEND_DELAY_MS`
//! (500 ms unless set), with no pause after the last one.
//!
//! ## Environment Configuration
//!
//! The webhook URL comes from `--webhook`, `DISCORD_WEBHOOK_URL`, or the
//! local store, in that order.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::{BridgeError, Result};
use crate::models::DiscordMessage;
use crate::traits::MessageSink;

/// What Discord reports about a webhook when it is fetched with GET.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// Discord webhook client for delivering converted messages.
///
/// ## Fields
///
/// - `client`: Reusable HTTP client for making webhook requests
/// - `webhook_url`: Full webhook URL, `https://discord.com/api/webhooks/{id}/{token}`
///
/// ## Thread Safety
///
/// This struct is `Clone` and can be shared across async tasks. The
/// underlying `reqwest::Client` is designed for concurrent use.
#[derive(Clone)]
pub struct WebhookClient {
    /// Reusable HTTP client; handles connection pooling.
    client: Client,

    webhook_url: String,
}

impl WebhookClient {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), webhook_url)
    }

    /// Use an existing HTTP client, sharing its connection pool.
    pub fn with_client(client: Client, webhook_url: impl Into<String>) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Confirms the webhook exists before it is saved.
    ///
    /// ## Error Handling
    ///
    /// - **Empty URL**: `InvalidWebhook` without any request
    /// - **Non-2xx status**: `InvalidWebhook` naming the status
    /// - **Body without `channel_id`**: `InvalidWebhook`
    /// - **Network failures**: Propagated as `BridgeError::Http`
    pub async fn verify(&self) -> Result<WebhookInfo> {
        if self.webhook_url.trim().is_empty() {
            return Err(BridgeError::InvalidWebhook {
                reason: "webhook URL is empty".to_string(),
            });
        }

        let response = self
            .client
            .get(&self.webhook_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::InvalidWebhook {
                reason: format!("Discord returned {status}"),
            });
        }

        let body = response.text().await?;
        let info: WebhookInfo =
            serde_json::from_str(&body).map_err(|e| BridgeError::InvalidWebhook {
                reason: format!("could not confirm the channel: {e}"),
            })?;

        info!(
            "Verified webhook {} for channel {}",
            info.name.as_deref().unwrap_or("(unnamed)"),
            info.channel_id
        );
        Ok(info)
    }
}

#[async_trait]
impl MessageSink for WebhookClient {
    fn name(&self) -> &str {
        "Discord webhook"
    }

    /// Posts one message as JSON.
    ///
    /// A non-2xx response becomes `WebhookRejected` carrying the status and
    /// the `message` field of Discord's error body.
    async fn deliver(&self, message: &DiscordMessage) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!("Discord accepted message with status {status}");
            return Ok(());
        }

        let reason = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| "Unknown error".to_string());

        error!("Failed to send Discord message: {status} {reason}");
        Err(BridgeError::WebhookRejected {
            status: status.as_u16(),
            message: reason,
        })
    }
}

/// Hide the token segment of a webhook URL for display.
///
/// `https://discord.com/api/webhooks/123/abcdef` becomes
/// `https://discord.com/api/webhooks/123/ab****`.
pub fn mask_webhook_url(url: &str) -> String {
    match url.trim_end_matches('/').rsplit_once('/') {
        Some((base, token)) if !token.is_empty() => {
            let visible: String = token.chars().take(2).collect();
            format!("{base}/{visible}****")
        }
        _ => "****".to_string(),
    }
}
