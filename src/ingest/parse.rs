// src/ingest/parse.rs
//! Defensive conversion of raw feed entries into canonical `Item`s.
//! Every field gets a default; nothing here fails.

use crate::corpus::Item;
use crate::ingest::normalize_text;
use crate::ingest::types::RawEntry;

/// Placeholder title for entries that carry none ("untitled").
pub const DEFAULT_TITLE: &str = "无标题";

pub fn parse_entries(entries: Vec<RawEntry>) -> Vec<Item> {
    entries.into_iter().map(parse_entry).collect()
}

pub fn parse_entry(entry: RawEntry) -> Item {
    let title = entry
        .title
        .as_deref()
        .map(normalize_text)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let link = entry.link.as_deref().map(str::trim).unwrap_or_default();
    let summary = entry.summary.as_deref().map(normalize_text).unwrap_or_default();

    // published wins; updated is the fallback
    let published = [entry.published.as_deref(), entry.updated.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    Item::new(title, link, summary, published)
}
