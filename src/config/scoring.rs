// src/config/scoring.rs
//! Booster substrings and the bilingual stopword set used by the scorer.
//!
//! File shape (TOML or JSON, both keys optional):
//! ```toml
//! boosters = ["突发", "Breaking"]
//! stopwords = ["the", "的"]
//! ```
//! A missing key keeps the built-in seed for that list.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SCORING_PATH: &str = "CLEAN_NEWS_SCORING_PATH";

/// Titles containing any of these (case-sensitive) get the flat boost.
const DEFAULT_BOOSTERS: &[&str] = &[
    "突发", "重磅", "独家", "首发", "警告", "严重", "关键", "紧急", "Breaking", "URGENT", "Alert",
    "Exclusive",
];

const DEFAULT_STOPWORDS_ZH: &[&str] = &[
    "的", "了", "是", "在", "和", "有", "也", "就", "不", "人", "都", "一", "一个", "上", "很", "到",
    "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这", "那", "之", "为", "以", "从",
    "与", "及", "等", "其", "或", "中", "我", "他", "她", "它", "我们", "你们", "他们", "被", "把", "让",
    "向", "往", "对于", "关于",
];

const DEFAULT_STOPWORDS_EN: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on", "with",
    "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we", "say", "her",
    "she", "or", "an", "will", "my", "one", "all", "would", "there", "their", "what", "so", "up",
    "out", "if", "about", "who", "get", "which", "go", "me", "when", "make", "can", "like", "time",
    "no", "just", "him", "know", "take", "people", "into", "year", "your", "good", "some", "could",
    "them", "see", "other", "than", "then", "now", "look", "only", "come", "its", "over", "think",
    "also", "back", "after", "use", "two", "how", "our", "work", "first", "well", "way", "even",
    "new", "want", "because", "any", "these", "give", "day", "most", "us",
];

/// Static scoring vocabulary, injected into `Tokenizer` / `Scorer` at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub boosters: Vec<String>,
    pub stopwords: HashSet<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            boosters: default_boosters(),
            stopwords: default_stopwords(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScoringFile {
    #[serde(default)]
    boosters: Option<Vec<String>>,
    #[serde(default)]
    stopwords: Option<Vec<String>>,
}

impl ScoringConfig {
    pub fn new<B, S>(boosters: B, stopwords: S) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            boosters: boosters.into_iter().map(Into::into).collect(),
            stopwords: stopwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Load from an explicit TOML or JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, &ext)
            .with_context(|| format!("parsing scoring config {}", path.display()))
    }

    /// Resolution order:
    /// 1) $CLEAN_NEWS_SCORING_PATH
    /// 2) config/scoring.toml
    /// 3) config/scoring.json
    /// 4) built-in seed
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SCORING_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_SCORING_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        for candidate in ["config/scoring.toml", "config/scoring.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from_file(&p);
            }
        }
        Ok(Self::default())
    }

    fn parse(content: &str, hint_ext: &str) -> Result<Self> {
        let file: ScoringFile = if hint_ext == "json" {
            serde_json::from_str(content)?
        } else {
            match toml::from_str(content) {
                Ok(f) => f,
                Err(toml_err) => serde_json::from_str(content)
                    .map_err(|_| anyhow!("unsupported scoring config format: {toml_err}"))?,
            }
        };

        let boosters = file
            .boosters
            .map(clean_list)
            .unwrap_or_else(default_boosters);
        let stopwords = file
            .stopwords
            .map(|v| clean_list(v).into_iter().collect())
            .unwrap_or_else(default_stopwords);

        Ok(Self {
            boosters,
            stopwords,
        })
    }
}

fn default_boosters() -> Vec<String> {
    DEFAULT_BOOSTERS.iter().map(|s| s.to_string()).collect()
}

fn default_stopwords() -> HashSet<String> {
    DEFAULT_STOPWORDS_ZH
        .iter()
        .chain(DEFAULT_STOPWORDS_EN)
        .map(|s| s.to_string())
        .collect()
}

/// Trim, drop empties, keep first occurrence order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn seed_has_both_languages() {
        let c = ScoringConfig::default();
        assert_eq!(c.boosters.len(), 12);
        assert!(c.boosters.iter().any(|b| b == "突发"));
        assert!(c.boosters.iter().any(|b| b == "Breaking"));
        assert!(c.stopwords.contains("的"));
        assert!(c.stopwords.contains("我们"));
        assert!(c.stopwords.contains("the"));
        assert!(c.stopwords.contains("us"));
        assert!(!c.stopwords.contains("market"));
    }

    #[test]
    fn partial_file_keeps_seed_for_missing_key() {
        let c = ScoringConfig::parse(r#"boosters = [" Hot ", "", "Hot"]"#, "toml").unwrap();
        assert_eq!(c.boosters, vec!["Hot".to_string()]);
        assert_eq!(c.stopwords, default_stopwords());

        let j = ScoringConfig::parse(r#"{"stopwords": ["foo"]}"#, "json").unwrap();
        assert_eq!(j.boosters, default_boosters());
        assert_eq!(j.stopwords.len(), 1);
        assert!(j.stopwords.contains("foo"));
    }

    #[test]
    fn json_content_without_extension_hint() {
        let c = ScoringConfig::parse(r#"{"boosters": ["X"]}"#, "").unwrap();
        assert_eq!(c.boosters, vec!["X".to_string()]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(ScoringConfig::parse("[[[ not valid", "").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_SCORING_PATH);

        assert_eq!(ScoringConfig::load_default().unwrap(), ScoringConfig::default());

        let p = tmp.path().join("scoring.json");
        fs::write(&p, r#"{"boosters": ["Flash"]}"#).unwrap();
        env::set_var(ENV_SCORING_PATH, p.display().to_string());
        let c = ScoringConfig::load_default().unwrap();
        assert_eq!(c.boosters, vec!["Flash".to_string()]);

        env::set_var(ENV_SCORING_PATH, tmp.path().join("missing.toml"));
        assert!(ScoringConfig::load_default().is_err());
        env::remove_var(ENV_SCORING_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
