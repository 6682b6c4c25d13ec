//! Identifier normalisation and output limiting.

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

/// Response bodies larger than this are cut with an omission note.
pub const MAX_RESPONSE_CHARS: usize = 50_000;

/// Trailing ID in a notion.so URL: 32 bare hex chars or a dashed UUID.
static URL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)notion\.so/(?:[^/]+/)*([a-f0-9]{32}|[a-f0-9-]{36})\s*$").expect("valid regex")
});

/// ID embedded at the end of a page slug: "Page-Title-<32 hex>".
static SLUG_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^a-f0-9]([a-f0-9]{32})$").expect("valid regex"));

/// Normalise a page/database identifier from whatever the caller pasted:
/// a bare ID, a dashed UUID, a notion.so URL, or a slugged URL. Anything
/// unrecognisable passes through unchanged — the store produces the error.
pub fn parse_notion_id(input: &str) -> String {
    let mut cleaned = input.trim();
    if let Some(i) = cleaned.find('?') {
        cleaned = &cleaned[..i];
    }
    if let Some(i) = cleaned.find('#') {
        cleaned = &cleaned[..i];
    }

    let mut cleaned = cleaned.to_string();
    if let Some(caps) = URL_ID.captures(&cleaned) {
        cleaned = caps[1].to_string();
    }
    if let Some(caps) = SLUG_ID.captures(&cleaned) {
        cleaned = caps[1].to_string();
    }

    match Uuid::parse_str(&cleaned) {
        Ok(uuid) => uuid.simple().to_string(),
        Err(_) => cleaned,
    }
}

/// Cut `text` at `max_len` characters with a note about what was dropped.
pub fn truncate_if_needed(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n\n...[truncated, {} characters omitted]",
        &text[..end],
        text.len() - end
    )
}
