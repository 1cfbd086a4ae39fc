//! Traits and interfaces for destination-agnostic delivery

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::models::DiscordMessage;

/// Something that accepts converted Discord messages one at a time.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Display name used in logs
    fn name(&self) -> &str;

    /// Deliver a single message
    ///
    /// # Returns
    /// * `Result<()>` - `Ok` once the destination accepted the message
    async fn deliver(&self, message: &DiscordMessage) -> Result<()>;

    /// Deliver `messages` in order, pausing `delay` between sends.
    ///
    /// Stops at the first failure; messages after it are not attempted.
    ///
    /// # Returns
    /// * `Result<usize>` - Number of messages delivered
    async fn deliver_all(&self, messages: &[DiscordMessage], delay: Duration) -> Result<usize> {
        for (index, message) in messages.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.deliver(message).await?;
            info!(
                "Delivered message {}/{} to {}",
                index + 1,
                messages.len(),
                self.name()
            );
        }

        Ok(messages.len())
    }
}
