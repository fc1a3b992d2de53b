// src/corpus.rs
//! Canonical feed items and the ordered source → items mapping shared by the
//! fetch layer, the scorer, and the renderer.

use serde::{Deserialize, Serialize};

/// One normalized feed entry. Every text field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Raw published/updated string as found in the feed (possibly empty).
    pub published: String,
    /// Assigned by the scorer, once per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        summary: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            summary: summary.into(),
            published: published.into(),
            score: None,
        }
    }

    /// Title and summary joined by a single space; the text the scorer tokenizes.
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// Items belonging to one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItems {
    pub source: String,
    pub items: Vec<Item>,
}

/// Insertion-ordered mapping from source name to its items.
///
/// Inserting a name that is already present replaces its items but keeps the
/// original position, so the order always follows the feed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMap {
    sources: Vec<SourceItems>,
}

/// Scorer input: every source's fetched items.
pub type Corpus = SourceMap;

/// Scorer output: every source's items ranked by score and truncated.
pub type RankedResult = SourceMap;

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, items: Vec<Item>) {
        let source = source.into();
        match self.sources.iter_mut().find(|s| s.source == source) {
            Some(existing) => existing.items = items,
            None => self.sources.push(SourceItems { source, items }),
        }
    }

    pub fn get(&self, source: &str) -> Option<&[Item]> {
        self.sources
            .iter()
            .find(|s| s.source == source)
            .map(|s| s.items.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.sources
            .iter()
            .map(|s| (s.source.as_str(), s.items.as_slice()))
    }

    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.source.as_str())
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total number of items across all sources.
    pub fn item_count(&self) -> usize {
        self.sources.iter().map(|s| s.items.len()).sum()
    }
}

impl IntoIterator for SourceMap {
    type Item = SourceItems;
    type IntoIter = std::vec::IntoIter<SourceItems>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<Item>)> for SourceMap {
    fn from_iter<I: IntoIterator<Item = (S, Vec<Item>)>>(iter: I) -> Self {
        let mut map = SourceMap::new();
        for (source, items) in iter {
            map.insert(source, items);
        }
        map
    }
}
