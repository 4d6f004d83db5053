//! Text formatting helpers for note view-models

use crate::config;
use chrono::{DateTime, Utc};

/// Neutralize characters that are unsafe inside HTML text and attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse of `escape_html`, for surfaces that show plain text
pub fn unescape_html(input: &str) -> String {
    // `&amp;` last so "&amp;lt;" decodes to "&lt;" and not "<"
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Escape note content and keep its line breaks visible
pub fn content_to_html(content: &str) -> String {
    escape_html(content)
        .replace("\r\n", "\n")
        .replace('\n', config::LINE_BREAK_MARKUP)
}

/// Creation date as day.month.year in UTC, empty when unknown
pub fn format_created(created: Option<DateTime<Utc>>) -> String {
    created
        .map(|dt| dt.format(config::CREATED_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
