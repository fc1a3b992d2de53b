// src/analyze/scoring.rs
//! Cross-source resonance scoring.
//!
//! Three passes over one `Corpus`:
//! 1. tokenize every item (title + summary) into one global frequency table and
//!    take its 20 most common tokens as the trending vocabulary;
//! 2. score each item = resonance + freshness + boost;
//! 3. per source, stable-sort by score (descending) and keep the top 10.
//!
//! Pass 2 only reads the table built in pass 1. Nothing here does I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use super::dates::{elapsed_days, parse_date};
use super::tokenizer::Tokenizer;
use crate::config::ScoringConfig;
use crate::corpus::{Corpus, Item, RankedResult};

pub const TOP_VOCABULARY_SIZE: usize = 20;
pub const MAX_ITEMS_PER_SOURCE: usize = 10;

pub const BOOST_POINTS: i64 = 100;
pub const FRESH_SAME_DAY_POINTS: i64 = 10;
pub const FRESH_PREVIOUS_DAY_POINTS: i64 = 5;

/// Trending tokens with their global counts, highest count first.
pub type TopVocabulary = Vec<(String, u64)>;

/// Everything one scoring run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub ranked: RankedResult,
    pub top_vocabulary: TopVocabulary,
}

/// Token counts in first-seen order.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    // token -> (count, first-seen rank)
    counts: HashMap<String, (u64, usize)>,
}

impl FrequencyTable {
    pub fn record(&mut self, token: &str) {
        let next_rank = self.counts.len();
        if let Some((count, _)) = self.counts.get_mut(token) {
            *count += 1;
        } else {
            self.counts.insert(token.to_string(), (1, next_rank));
        }
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).map_or(0, |(c, _)| *c)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` highest counts; equal counts keep first-seen order.
    pub fn most_common(&self, n: usize) -> TopVocabulary {
        let mut rows: Vec<(&String, u64, usize)> = self
            .counts
            .iter()
            .map(|(tok, (count, rank))| (tok, *count, *rank))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        rows.into_iter()
            .take(n)
            .map(|(tok, count, _)| (tok.clone(), count))
            .collect()
    }
}

/// Resonance scorer with injected vocabulary configuration.
#[derive(Debug, Clone)]
pub struct Scorer {
    tokenizer: Tokenizer,
    boosters: Vec<String>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(config.stopwords),
            boosters: config.boosters,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Run all three passes. Never fails; an empty corpus yields an empty report.
    pub fn score(&self, corpus: Corpus, now: DateTime<Utc>) -> ScoreReport {
        let t0 = Instant::now();

        // Pass 1: global pool. Tokens are kept per item for pass 2.
        let mut table = FrequencyTable::default();
        let tokens: Vec<Vec<Vec<String>>> = corpus
            .iter()
            .map(|(_, items)| {
                items
                    .iter()
                    .map(|item| {
                        let toks = self.tokenizer.tokenize(&item.scoring_text());
                        for t in &toks {
                            table.record(t);
                        }
                        toks
                    })
                    .collect()
            })
            .collect();

        let top_vocabulary = table.most_common(TOP_VOCABULARY_SIZE);
        let trending: HashMap<&str, u64> = top_vocabulary
            .iter()
            .map(|(tok, count)| (tok.as_str(), *count))
            .collect();

        // Pass 2 + 3
        let mut ranked = RankedResult::new();
        let mut scored = 0usize;
        for (entry, item_tokens) in corpus.into_iter().zip(tokens) {
            let mut items = entry.items;
            for (item, toks) in items.iter_mut().zip(&item_tokens) {
                let score = resonance_points(toks, &trending)
                    + freshness_points(&item.published, now)
                    + boost_points(&item.title, &self.boosters);
                item.score = Some(score);
                scored += 1;
            }
            rank_and_truncate(&mut items);
            ranked.insert(entry.source, items);
        }

        debug!(
            target: "scoring",
            sources = ranked.len(),
            items = scored,
            distinct_tokens = table.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0,
            "corpus scored"
        );

        ScoreReport {
            ranked,
            top_vocabulary,
        }
    }
}

/// Each occurrence of a trending token adds that token's global count.
fn resonance_points(tokens: &[String], trending: &HashMap<&str, u64>) -> i64 {
    tokens
        .iter()
        .filter_map(|t| trending.get(t.as_str()))
        .map(|c| *c as i64)
        .sum()
}

/// 10 for the same day, 5 for the previous day, otherwise 0.
pub fn freshness_points(published: &str, now: DateTime<Utc>) -> i64 {
    match parse_date(published).map(|dt| elapsed_days(now, dt)) {
        Some(0) => FRESH_SAME_DAY_POINTS,
        Some(1) => FRESH_PREVIOUS_DAY_POINTS,
        _ => 0,
    }
}

/// Flat boost if the raw title contains any booster (case-sensitive substring).
pub fn boost_points(title: &str, boosters: &[String]) -> i64 {
    if boosters.iter().any(|b| title.contains(b.as_str())) {
        BOOST_POINTS
    } else {
        0
    }
}

fn rank_and_truncate(items: &mut Vec<Item>) {
    // sort_by is stable: equal scores keep fetch order
    items.sort_by(|a, b| b.score.cmp(&a.score));
    items.truncate(MAX_ITEMS_PER_SOURCE);
}
