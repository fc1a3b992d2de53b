// src/analyze/tokenizer.rs
//! Bilingual tokenizer: regex runs for Latin script, jieba segmentation for Han.

use jieba_rs::Jieba;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// Segmenter dictionary is loaded once per process; it is read-only afterwards.
static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

static RE_LATIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]{2,}").expect("latin token regex"));

/// CJK Unified Ideographs range kept for segmentation.
#[inline]
fn is_han(c: char) -> bool {
    ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

/// Turns free text into filtered word tokens. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    stopwords: Arc<HashSet<String>>,
}

impl Tokenizer {
    pub fn new(stopwords: HashSet<String>) -> Self {
        Self {
            stopwords: Arc::new(stopwords),
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// English tokens first (in text order), then Chinese tokens.
    /// Tokens of one character and stopwords are dropped.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let lower = text.to_lowercase();
        let mut words: Vec<String> = RE_LATIN
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect();

        let han: String = text.chars().filter(|c| is_han(*c)).collect();
        if !han.is_empty() {
            words.extend(JIEBA.cut(&han, true).into_iter().map(str::to_string));
        }

        words.retain(|w| w.chars().count() > 1 && !self.is_stopword(w));
        words
    }
}
