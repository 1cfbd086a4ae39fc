//! Data models for Discord webhook payloads and conversion results

use serde::{Deserialize, Serialize};

/// Maximum length of an embed title
pub const EMBED_TITLE_LIMIT: usize = 256;
/// Maximum length of an embed description
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;
/// Maximum length of a field name
pub const EMBED_FIELD_NAME_LIMIT: usize = 256;
/// Maximum length of a field value
pub const EMBED_FIELD_VALUE_LIMIT: usize = 1024;
/// Maximum length of footer text
pub const EMBED_FOOTER_LIMIT: usize = 2048;
/// Maximum length of plain message content
pub const MESSAGE_CONTENT_LIMIT: usize = 2000;

/// Discord webhook message payload
///
/// A message carries plain `content`, one or more embeds, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<DiscordEmbed>,
}

impl DiscordMessage {
    /// A plain-text message
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }

    /// A message holding a single embed
    pub fn embed(embed: DiscordEmbed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }

    /// Characters counted against Discord's limits for this message
    pub fn char_count(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
            + self.embeds.iter().map(DiscordEmbed::char_count).sum::<usize>()
    }
}

/// Discord embed structure for rich messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordEmbed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default)]
    pub fields: Vec<DiscordField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<DiscordFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DiscordEmbed {
    /// Sum of title, description, field and footer lengths
    pub fn char_count(&self) -> usize {
        let len = |s: &Option<String>| s.as_deref().map_or(0, |s| s.chars().count());

        len(&self.title)
            + len(&self.description)
            + self
                .fields
                .iter()
                .map(|f| f.name.chars().count() + f.value.chars().count())
                .sum::<usize>()
            + self.footer.as_ref().map_or(0, |f| f.text.chars().count())
    }
}

/// Key-value field for Discord embeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Footer line shown under an embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordFooter {
    pub text: String,
}

/// Aggregate numbers describing one conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub message_count: usize,
    pub total_characters: usize,
    pub embed_count: usize,
    pub field_count: usize,
}

/// Messages produced from one markdown document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub messages: Vec<DiscordMessage>,
    pub metadata: ConversionMetadata,
}
