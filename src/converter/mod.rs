//! # Markdown to Discord conversion
//!
//! Turns a Markdown document into the messages a Discord webhook accepts.
//!
//! ## Mapping
//!
//! - **`#` / `##` headings** open a new embed. The heading becomes the title
//!   and picks the accent color.
//! - **`###` / `####` headings** become fields of the current embed, with
//!   the following lines as the value. Outside an embed they are ignored.
//! - **Loose text** under a heading becomes the embed description, unless the
//!   embed already has fields.
//! - **Text before the first heading** is sent as plain messages, split to
//!   stay under Discord's 2000 character limit.
//! - **`---` rules** are dropped.
//!
//! Oversized titles, descriptions and fields are truncated with `...` rather
//! than rejected. Conversion never fails.

mod inline;
mod sections;
mod splitter;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::models::{
    ConversionMetadata, ConversionResult, DiscordFooter, DiscordMessage, EMBED_FOOTER_LIMIT,
    MESSAGE_CONTENT_LIMIT,
};

pub use inline::to_discord;
pub use splitter::split_content;

use sections::{EmbedStyle, ParsedSection, parse_sections};

pub const COLOR_GREEN: u32 = 0x0057_F287;
pub const COLOR_BLURPLE: u32 = 0x0058_65F2;
pub const COLOR_RED: u32 = 0x00ED_4245;
pub const COLOR_YELLOW: u32 = 0x00FE_E75C;
pub const COLOR_FUCHSIA: u32 = 0x00EB_459E;

/// Title keywords and the accent color they select. First match wins.
const TITLE_COLORS: &[(&[&str], u32)] = &[
    (&["release", "notas"], COLOR_GREEN),
    (&["integração", "integration"], COLOR_BLURPLE),
    (&["erro", "error"], COLOR_RED),
    (&["melhoria", "improvement"], COLOR_YELLOW),
    (&["feature", "novo"], COLOR_FUCHSIA),
];

/// Converts Markdown documents into Discord messages.
///
/// A converter holds no state between calls and can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    footer: Option<String>,
    now: Option<DateTime<Utc>>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach footer text to every embed.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Pin the embed timestamp instead of reading the wall clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn convert(&self, markdown: &str) -> ConversionResult {
        let now = self.now.unwrap_or_else(Utc::now);
        let style = EmbedStyle {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            footer: self
                .footer
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(|text| DiscordFooter {
                    text: truncate(text, EMBED_FOOTER_LIMIT),
                }),
        };

        let sections = parse_sections(&preprocess(markdown), &style);
        let result = assemble(sections);

        debug!(
            messages = result.metadata.message_count,
            embeds = result.metadata.embed_count,
            fields = result.metadata.field_count,
            characters = result.metadata.total_characters,
            "converted markdown"
        );
        result
    }
}

/// Convert `markdown` with default settings, stamping embeds with the
/// current time.
pub fn convert(markdown: &str) -> ConversionResult {
    Converter::new().convert(markdown)
}

/// Replace literal `\n` escape sequences with real line breaks.
pub fn preprocess(markdown: &str) -> String {
    markdown.replace("\\n", "\n")
}

/// Accent color for an embed title.
pub fn color_for_title(title: &str) -> u32 {
    let title = title.to_lowercase();

    TITLE_COLORS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| title.contains(k)))
        .map_or(COLOR_BLURPLE, |&(_, color)| color)
}

/// Cut `text` to `limit` characters, ending in `...` when shortened.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().nth(limit).is_none() {
        return text.to_string();
    }

    let keep = limit.saturating_sub(3);
    let cut = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    format!("{}...", &text[..cut])
}

fn assemble(sections: Vec<ParsedSection>) -> ConversionResult {
    let mut messages = Vec::new();
    let mut metadata = ConversionMetadata::default();

    for section in sections {
        match section {
            ParsedSection::Embed(embed) => {
                metadata.embed_count += 1;
                metadata.field_count += embed.fields.len();
                metadata.total_characters += embed.char_count();
                messages.push(DiscordMessage::embed(embed));
            }
            ParsedSection::Content(content) => {
                for chunk in split_content(&content, MESSAGE_CONTENT_LIMIT) {
                    metadata.total_characters += chunk.chars().count();
                    messages.push(DiscordMessage::text(chunk));
                }
            }
        }
    }

    metadata.message_count = messages.len();
    ConversionResult { messages, metadata }
}
