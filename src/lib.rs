//! Convert Markdown into Discord messages and deliver them through a webhook.
//!
//! The conversion itself lives in [`converter`] and is a pure function of
//! its input. Everything else loads input, stores settings, or talks to
//! Discord.

pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod converter;
pub mod database;
pub mod discord;
pub mod error;
pub mod export;
pub mod input;
pub mod models;
pub mod traits;

pub use converter::{Converter, convert};
pub use error::BridgeError;
pub use models::{ConversionMetadata, ConversionResult, DiscordEmbed, DiscordField, DiscordMessage};
