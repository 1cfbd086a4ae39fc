use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::converter::Converter;
use crate::database::Database;
use crate::discord::{WebhookClient, WebhookInfo, mask_webhook_url};
use crate::error::BridgeError;
use crate::input::{Source, read_markdown};
use crate::models::ConversionResult;
use crate::traits::MessageSink;

/// Ties input loading, conversion, storage and delivery together.
#[derive(Debug, Clone)]
pub struct Bridge {
    config: Config,
}

impl Bridge {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn database(&self) -> Result<Database> {
        Database::new(&self.config.database_url)
            .await
            .with_context(|| format!("opening settings store {}", self.config.database_url))
    }

    /// Load and convert one document.
    pub async fn convert(&self, source: &Source, footer: Option<&str>) -> Result<ConversionResult> {
        let markdown = read_markdown(source, self.config.max_input_bytes)
            .await
            .with_context(|| match source {
                Source::Stdin => "reading markdown from stdin".to_string(),
                Source::File(path) => format!("reading markdown from {}", path.display()),
            })?;

        let mut converter = Converter::new();
        if let Some(footer) = footer {
            converter = converter.with_footer(footer);
        }
        let result = converter.convert(&markdown);

        let meta = result.metadata;
        info!(
            "Converted into {} messages ({} embeds, {} fields, {} characters)",
            meta.message_count, meta.embed_count, meta.field_count, meta.total_characters
        );
        if result.messages.is_empty() {
            warn!("Input produced no messages");
        }

        Ok(result)
    }

    /// Pick the webhook: explicit flag, then environment, then the store.
    pub async fn resolve_webhook(&self, flag: Option<&str>) -> Result<String> {
        let explicit = flag
            .or(self.config.webhook_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty());
        if let Some(url) = explicit {
            return Ok(url.to_string());
        }

        self.database()
            .await?
            .webhook_url()
            .await?
            .ok_or_else(|| BridgeError::MissingWebhook.into())
    }

    /// Deliver every message, returning how many were sent.
    pub async fn send(
        &self,
        result: &ConversionResult,
        webhook_url: &str,
        delay: Option<Duration>,
    ) -> Result<usize> {
        let client = WebhookClient::new(webhook_url);
        let delay = delay.unwrap_or(self.config.send_delay);

        info!(
            "Sending {} messages to {}",
            result.messages.len(),
            mask_webhook_url(webhook_url)
        );
        let sent = client
            .deliver_all(&result.messages, delay)
            .await
            .context("sending to Discord")?;

        info!("Sent {sent} messages to Discord");
        Ok(sent)
    }

    /// Store a webhook URL, verifying it with Discord first unless told not to.
    pub async fn save_webhook(&self, url: &str, verify: bool) -> Result<Option<WebhookInfo>> {
        let url = url.trim();
        if url.is_empty() {
            return Err(BridgeError::InvalidWebhook {
                reason: "webhook URL is empty".to_string(),
            }
            .into());
        }

        let info = if verify {
            Some(WebhookClient::new(url).verify().await?)
        } else {
            None
        };

        self.database().await?.save_webhook_url(url).await?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(webhook_url: Option<&str>, database_url: &str) -> Bridge {
        Bridge::new(Config {
            webhook_url: webhook_url.map(str::to_string),
            database_url: database_url.to_string(),
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn flag_beats_environment() {
        let bridge = bridge(Some("https://env/1/a"), "sqlite::memory:");
        let url = bridge.resolve_webhook(Some(" https://flag/1/b ")).await.unwrap();
        assert_eq!(url, "https://flag/1/b");
    }

    #[tokio::test]
    async fn environment_used_without_flag() {
        let bridge = bridge(Some("https://env/1/a"), "sqlite::memory:");
        assert_eq!(bridge.resolve_webhook(None).await.unwrap(), "https://env/1/a");
    }

    #[tokio::test]
    async fn store_used_last() {
        let dir = tempfile::tempdir().unwrap();
        let db_url = format!("sqlite:{}", dir.path().join("s.db").display());
        let bridge = bridge(None, &db_url);

        let err = bridge.resolve_webhook(None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::MissingWebhook)
        ));

        bridge
            .save_webhook("https://stored/1/c", false)
            .await
            .unwrap();
        assert_eq!(bridge.resolve_webhook(None).await.unwrap(), "https://stored/1/c");
    }

    #[tokio::test]
    async fn empty_webhook_is_not_saved() {
        let bridge = bridge(None, "sqlite::memory:");
        let err = bridge.save_webhook("   ", false).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::InvalidWebhook { .. })
        ));
    }

    #[tokio::test]
    async fn oversized_input_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &[b'#'; 20]).unwrap();
        let bridge = Bridge::new(Config {
            max_input_bytes: 10,
            ..Config::default()
        });

        let err = bridge
            .convert(&Source::File(file.path().to_path_buf()), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BridgeError>(),
            Some(BridgeError::ContentTooLarge { size: 20, limit: 10 })
        ));
    }
}
