//! Line scanner that groups a document into embed and content sections.

use tracing::debug;

use super::inline::{closes_fence, opens_fence, to_discord};
use super::{color_for_title, truncate};
use crate::models::{
    DiscordEmbed, DiscordField, DiscordFooter, EMBED_DESCRIPTION_LIMIT, EMBED_FIELD_NAME_LIMIT,
    EMBED_FIELD_VALUE_LIMIT, EMBED_TITLE_LIMIT,
};

/// A finalized section, ready to be turned into messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSection {
    Embed(DiscordEmbed),
    Content(String),
}

/// Values stamped onto every embed opened during one parse.
#[derive(Debug, Clone)]
pub(crate) struct EmbedStyle {
    pub timestamp: String,
    pub footer: Option<DiscordFooter>,
}

/// The section currently collecting lines.
enum Active {
    /// Plain text seen before any level-1/2 heading.
    Content(String),
    /// An embed under construction plus the loose text gathered for it.
    Embed { embed: DiscordEmbed, pending: String },
}

enum LineKind<'a> {
    /// `# ` or `## `
    Section(&'a str),
    /// `### ` or `#### `
    Field(&'a str),
    /// `---`
    Rule,
    Text,
}

/// Scanner state threaded from one line to the next.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    line: usize,
    in_fence: bool,
}

pub(crate) fn parse_sections(markdown: &str, style: &EmbedStyle) -> Vec<ParsedSection> {
    let lines: Vec<&str> = markdown.split('\n').collect();
    let mut sections = Vec::new();
    let mut active = Active::Content(String::new());
    let mut cursor = Cursor::default();

    while cursor.line < lines.len() {
        cursor = consume_line(&lines, cursor, &mut active, &mut sections, style);
    }
    sections.extend(finalize(active));

    debug!(sections = sections.len(), lines = lines.len(), "parsed markdown");
    sections
}

/// Handle the line under `cursor` and return where scanning resumes.
fn consume_line(
    lines: &[&str],
    cursor: Cursor,
    active: &mut Active,
    sections: &mut Vec<ParsedSection>,
    style: &EmbedStyle,
) -> Cursor {
    let line = lines[cursor.line];
    let trimmed = line.trim();
    let next = Cursor {
        line: cursor.line + 1,
        in_fence: cursor.in_fence,
    };

    if cursor.in_fence || opens_fence(trimmed) {
        push_line(active, line);
        return Cursor {
            in_fence: !(cursor.in_fence && closes_fence(trimmed)),
            ..next
        };
    }

    match classify(trimmed) {
        LineKind::Section(heading) => {
            let opened = Active::Embed {
                embed: open_embed(heading, style),
                pending: String::new(),
            };
            sections.extend(finalize(std::mem::replace(active, opened)));
            next
        }
        LineKind::Field(heading) => match active {
            Active::Embed { embed, .. } => {
                let (value, stop) = scan_field(lines, next.line);
                if let Some(field) = build_field(heading, &value) {
                    embed.fields.push(field);
                }
                Cursor {
                    line: stop,
                    in_fence: false,
                }
            }
            Active::Content(_) => next,
        },
        LineKind::Rule => next,
        LineKind::Text => {
            push_line(active, line);
            next
        }
    }
}

fn classify(trimmed: &str) -> LineKind<'_> {
    if trimmed.starts_with("# ") || trimmed.starts_with("## ") {
        LineKind::Section(heading_text(trimmed))
    } else if trimmed.starts_with("### ") || trimmed.starts_with("#### ") {
        LineKind::Field(heading_text(trimmed))
    } else if trimmed == "---" {
        LineKind::Rule
    } else {
        LineKind::Text
    }
}

fn heading_text(trimmed: &str) -> &str {
    trimmed.trim_start_matches('#').trim_start()
}

fn push_line(active: &mut Active, line: &str) {
    let buffer = match active {
        Active::Content(buffer) => buffer,
        Active::Embed { pending, .. } => pending,
    };
    buffer.push_str(line);
    buffer.push('\n');
}

/// Collect a field body starting at `start`.
///
/// Stops before the next line that starts with `#` or is a `---` rule,
/// ignoring both inside fenced code. Returns the trimmed body and the index
/// of the line where the outer scan resumes.
fn scan_field(lines: &[&str], start: usize) -> (String, usize) {
    let mut in_fence = false;
    let mut stop = start;

    while let Some(line) = lines.get(stop) {
        let trimmed = line.trim();
        if !in_fence && (trimmed.starts_with('#') || trimmed == "---") {
            break;
        }
        in_fence = if in_fence {
            !closes_fence(trimmed)
        } else {
            opens_fence(trimmed)
        };
        stop += 1;
    }

    (lines[start..stop].join("\n").trim().to_string(), stop)
}

fn open_embed(heading: &str, style: &EmbedStyle) -> DiscordEmbed {
    let title = to_discord(heading);

    DiscordEmbed {
        color: Some(color_for_title(&title)),
        title: Some(truncate(&title, EMBED_TITLE_LIMIT)),
        description: None,
        fields: Vec::new(),
        footer: style.footer.clone(),
        timestamp: Some(style.timestamp.clone()),
    }
}

fn build_field(heading: &str, value: &str) -> Option<DiscordField> {
    if value.is_empty() {
        return None;
    }

    Some(DiscordField {
        name: truncate(&to_discord(heading), EMBED_FIELD_NAME_LIMIT),
        value: truncate(&to_discord(value), EMBED_FIELD_VALUE_LIMIT),
        inline: false,
    })
}

/// Close a section. Loose text only becomes a description when the embed
/// has no fields; with fields present it is dropped.
fn finalize(active: Active) -> Option<ParsedSection> {
    match active {
        Active::Embed {
            mut embed,
            pending,
        } => {
            let pending = pending.trim();
            if embed.fields.is_empty() && !pending.is_empty() {
                embed.description = Some(truncate(&to_discord(pending), EMBED_DESCRIPTION_LIMIT));
            }
            Some(ParsedSection::Embed(embed))
        }
        Active::Content(buffer) => {
            let content = buffer.trim();
            (!content.is_empty()).then(|| ParsedSection::Content(content.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn style() -> EmbedStyle {
        EmbedStyle {
            timestamp: "2024-05-01T12:00:00.000Z".to_string(),
            footer: None,
        }
    }

    fn embeds(sections: &[ParsedSection]) -> Vec<&DiscordEmbed> {
        sections
            .iter()
            .filter_map(|s| match s {
                ParsedSection::Embed(embed) => Some(embed),
                ParsedSection::Content(_) => None,
            })
            .collect()
    }

    #[test]
    fn empty_input_has_no_sections() {
        assert!(parse_sections("", &style()).is_empty());
        assert!(parse_sections("\n  \n---\n", &style()).is_empty());
    }

    #[test]
    fn heading_opens_an_embed_with_description() {
        let sections = parse_sections("# Title\nBody text", &style());

        assert_eq!(
            sections,
            vec![ParsedSection::Embed(DiscordEmbed {
                title: Some("Title".to_string()),
                description: Some("Body text".to_string()),
                color: Some(0x0058_65F2),
                fields: Vec::new(),
                footer: None,
                timestamp: Some("2024-05-01T12:00:00.000Z".to_string()),
            })]
        );
    }

    #[test]
    fn subheadings_become_fields() {
        let sections = parse_sections(
            "## Features\n### Added\nNew button\n### Fixed\nCrash on load",
            &style(),
        );
        let embeds = embeds(&sections);

        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].title.as_deref(), Some("Features"));
        assert_eq!(embeds[0].description, None);
        assert_eq!(
            embeds[0].fields,
            vec![
                DiscordField {
                    name: "Added".to_string(),
                    value: "New button".to_string(),
                    inline: false,
                },
                DiscordField {
                    name: "Fixed".to_string(),
                    value: "Crash on load".to_string(),
                    inline: false,
                },
            ]
        );
    }

    #[test]
    fn field_body_spans_lines_until_next_heading_or_rule() {
        let sections = parse_sections(
            "## Notes\n#### Changes\n- one\n\n- two\n---\nloose\n### Empty\n## Next",
            &style(),
        );
        let embeds = embeds(&sections);

        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].fields.len(), 1);
        assert_eq!(embeds[0].fields[0].value, "• one\n\n• two");
        // Loose text is dropped once the embed has fields.
        assert_eq!(embeds[0].description, None);
        assert_eq!(embeds[1].title.as_deref(), Some("Next"));
    }

    #[test]
    fn field_body_stops_at_any_hash_line() {
        let sections = parse_sections("# A\n### F\nvalue\n#hashtag\nafter", &style());
        let embeds = embeds(&sections);

        assert_eq!(embeds[0].fields[0].value, "value");
        // `#hashtag` is plain text once the scan resumes there.
        assert_eq!(embeds[0].description, None);
    }

    #[test]
    fn subheading_without_embed_is_ignored() {
        let sections = parse_sections("### Orphan\ntext below", &style());
        assert_eq!(
            sections,
            vec![ParsedSection::Content("text below".to_string())]
        );
    }

    #[test]
    fn leading_text_becomes_content_before_first_embed() {
        let sections = parse_sections("intro line\n\n# Title\nbody", &style());

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0], ParsedSection::Content("intro line".to_string()));
        assert!(matches!(&sections[1], ParsedSection::Embed(e) if e.description.as_deref() == Some("body")));
    }

    #[test]
    fn rules_are_discarded() {
        let sections = parse_sections("a\n---\n  ---  \nb", &style());
        assert_eq!(sections, vec![ParsedSection::Content("a\nb".to_string())]);
    }

    #[test]
    fn hash_inside_fence_is_not_a_heading() {
        let markdown = "# Real\n```md\n# not a heading\n---\n```\ntext";
        let sections = parse_sections(markdown, &style());
        let embeds = embeds(&sections);

        assert_eq!(embeds.len(), 1);
        assert_eq!(
            embeds[0].description.as_deref(),
            Some("```md\n# not a heading\n---\n```\ntext")
        );
    }

    #[test]
    fn fence_inside_field_body_is_kept_whole() {
        let markdown = "## Setup\n### Config\n```toml\n# comment\n```\n### Next\nx";
        let sections = parse_sections(markdown, &style());
        let embeds = embeds(&sections);

        assert_eq!(embeds[0].fields.len(), 2);
        assert_eq!(embeds[0].fields[0].value, "```toml\n# comment\n```");
        assert_eq!(embeds[0].fields[1].value, "x");
    }

    #[test]
    fn fence_in_leading_content_hides_headings() {
        let sections = parse_sections("```\n# not a heading\n```", &style());
        assert_eq!(
            sections,
            vec![ParsedSection::Content("```\n# not a heading\n```".to_string())]
        );
    }

    #[test]
    fn one_line_backtick_span_is_not_a_fence() {
        let markdown = "# A\nRun ```npm i``` first\n```npm i```\n# B\ntext";
        let sections = parse_sections(markdown, &style());
        let embeds = embeds(&sections);

        assert_eq!(embeds.len(), 2);
        assert_eq!(
            embeds[0].description.as_deref(),
            Some("Run ```npm i``` first\n```npm i```")
        );
        assert_eq!(embeds[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn one_line_backtick_span_in_field_body_is_not_a_fence() {
        let sections = parse_sections("# A\n### F\n```npm i```\n### G\nv", &style());
        let embeds = embeds(&sections);

        assert_eq!(embeds[0].fields.len(), 2);
        assert_eq!(embeds[0].fields[0].value, "```npm i```");
        assert_eq!(embeds[0].fields[1].value, "v");
    }

    #[test]
    fn fence_with_non_word_tag_does_not_hide_headings() {
        // The inline formatter leaves such a block unprotected, so the parser does too.
        let sections = parse_sections("# A\n```c++\n# B\n```", &style());
        let embeds = embeds(&sections);

        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0].description.as_deref(), Some("```c++"));
        assert_eq!(embeds[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn heading_text_is_formatted_and_truncated() {
        let long = format!("# [{}](https://example.com)", "t".repeat(300));
        let sections = parse_sections(&long, &style());
        let title = embeds(&sections)[0].title.clone().unwrap_or_default();

        assert_eq!(title.chars().count(), EMBED_TITLE_LIMIT);
        assert!(title.starts_with("ttt"));
        assert!(title.ends_with("..."));
    }

    #[test]
    fn footer_is_stamped_on_every_embed() {
        let style = EmbedStyle {
            footer: Some(DiscordFooter {
                text: "v2".to_string(),
            }),
            ..style()
        };
        let sections = parse_sections("# A\n# B", &style);

        assert!(embeds(&sections)
            .iter()
            .all(|e| e.footer.as_ref().map(|f| f.text.as_str()) == Some("v2")));
    }
}
