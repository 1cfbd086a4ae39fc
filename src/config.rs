//! Environment-driven settings, loaded after `.env` has been read.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:md2discord.db";
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `DISCORD_WEBHOOK_URL`
    pub webhook_url: Option<String>,
    /// `DATABASE_URL`
    pub database_url: String,
    /// `DISCORD_SEND_DELAY_MS`
    pub send_delay: Duration,
    /// `MD2DISCORD_MAX_INPUT_BYTES`
    pub max_input_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: None,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            send_delay: DEFAULT_SEND_DELAY,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            webhook_url: non_empty("DISCORD_WEBHOOK_URL").map(|v| v.trim().to_string()),
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            send_delay: non_empty("DISCORD_SEND_DELAY_MS")
                .and_then(|v| parse_number("DISCORD_SEND_DELAY_MS", &v))
                .map_or(defaults.send_delay, Duration::from_millis),
            max_input_bytes: non_empty("MD2DISCORD_MAX_INPUT_BYTES")
                .and_then(|v| parse_number("MD2DISCORD_MAX_INPUT_BYTES", &v))
                .unwrap_or(defaults.max_input_bytes),
        }
    }
}

fn parse_number(key: &str, value: &str) -> Option<u64> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("Ignoring {key}={value:?}: {e}; using default");
            None
        }
    }
}
