//! JSON export of converted messages

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::models::DiscordMessage;

/// Pretty-printed JSON array of the messages, as the webhook receives them.
pub fn to_json(messages: &[DiscordMessage]) -> Result<String> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// `discord-messages-<unix millis>.json`
pub fn default_file_name(now: DateTime<Utc>) -> String {
    format!("discord-messages-{}.json", now.timestamp_millis())
}

pub async fn write_json(path: &Path, messages: &[DiscordMessage]) -> Result<()> {
    let json = to_json(messages)?;
    tokio::fs::write(path, json).await?;
    info!("Wrote {} messages to {}", messages.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_uses_two_space_indent() {
        let json = to_json(&[DiscordMessage::text("hi")]).unwrap();
        assert_eq!(json, "[\n  {\n    \"content\": \"hi\"\n  }\n]");
    }

    #[test]
    fn file_name_uses_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(default_file_name(now), "discord-messages-1700000000123.json");
    }

    #[tokio::test]
    async fn writes_messages_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let messages = vec![DiscordMessage::text("a"), DiscordMessage::text("b")];

        write_json(&path, &messages).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<DiscordMessage> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, messages);
    }
}
