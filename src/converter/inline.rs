//! Inline rewriting of Markdown spans into Discord-flavoured text.
//!
//! Discord already understands bold, italic, inline code and strikethrough,
//! so those pass through untouched. What changes is the syntax Discord does
//! not render inside embeds: link targets are dropped and list markers become
//! bullets. Fenced code blocks are located first and copied verbatim.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

const FENCE: &str = "```";

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("link pattern is valid"));

/// Rewrite a span of Markdown for display inside a Discord embed.
///
/// Applying this twice yields the same text as applying it once.
pub fn to_discord(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut at_line_start = true;

    for span in fence_spans(text) {
        rewrite_prose(&text[cursor..span.start], at_line_start, &mut out);
        out.push_str(&text[span.clone()]);
        // A fence closes on its backticks, so whatever follows is mid-line.
        at_line_start = false;
        cursor = span.end;
    }
    rewrite_prose(&text[cursor..], at_line_start, &mut out);

    out
}

/// Byte ranges of every fenced code block in `text`, in order.
///
/// A fence is three backticks, an optional language tag of word characters,
/// a newline, and everything up to the next three backticks. An opening
/// fence with no closing one is left as ordinary text.
pub(crate) fn fence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;

    while let Some(offset) = text[from..].find(FENCE) {
        let start = from + offset;
        let after_open = start + FENCE.len();
        let tag_len = text[after_open..]
            .find(|c: char| !is_word_char(c))
            .unwrap_or(text.len() - after_open);
        let body_start = after_open + tag_len;

        if text[body_start..].starts_with('\n')
            && let Some(close) = text[body_start + 1..].find(FENCE)
        {
            let end = body_start + 1 + close + FENCE.len();
            spans.push(start..end);
            from = end;
        } else {
            from = start + 1;
        }
    }

    spans
}

/// Whether a trimmed raw line opens a fenced code block.
///
/// Same shape as [`fence_spans`]: a run of at least three backticks, then
/// only word characters. A line such as ```` ```npm i``` ```` is inline code.
pub(crate) fn opens_fence(trimmed: &str) -> bool {
    let tag = trimmed.trim_start_matches('`');
    trimmed.len() - tag.len() >= FENCE.len() && tag.chars().all(is_word_char)
}

/// Whether a trimmed raw line closes an open fenced code block.
pub(crate) fn closes_fence(trimmed: &str) -> bool {
    trimmed.len() >= FENCE.len() && trimmed.bytes().all(|b| b == b'`')
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Apply the non-code transforms to a span that holds no fenced code.
fn rewrite_prose(segment: &str, at_line_start: bool, out: &mut String) {
    if segment.is_empty() {
        return;
    }

    let normalized = segment.replace("\\n", "\n");
    let unlinked = LINK.replace_all(&normalized, "$1");

    for (index, line) in unlinked.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if (index > 0 || at_line_start)
            && let Some(item) = list_item(line)
        {
            out.push_str("• ");
            out.push_str(item);
        } else {
            out.push_str(line);
        }
    }
}

/// The text after a `- ` or `* ` list marker, when there is some.
fn list_item(line: &str) -> Option<&str> {
    let item = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))?;

    (!item.is_empty() && !item.starts_with('\r')).then_some(item)
}
