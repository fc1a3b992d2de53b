// src/ingest/types.rs
use anyhow::Result;

/// An entry as it came out of the feed, before defensive normalization.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn name(&self) -> &str;
}
