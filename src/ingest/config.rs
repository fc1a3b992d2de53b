// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_FEEDS_PATH: &str = "CLEAN_NEWS_FEEDS_PATH";

/// Name used for feed entries that do not carry one.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// One configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct RawFeed {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Load feeds from an explicit path. Supports JSON (array) or TOML (`[[feeds]]`).
pub fn load_feeds_from(path: &Path) -> Result<Vec<FeedConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
}

/// Load feeds using env var + fallbacks:
/// 1) $CLEAN_NEWS_FEEDS_PATH
/// 2) feeds.json
/// 3) config/feeds.toml
/// 4) config/feeds.json
pub fn load_feeds_default() -> Result<Vec<FeedConfig>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("{ENV_FEEDS_PATH} points to non-existent path"));
        }
    }
    for candidate in ["feeds.json", "config/feeds.toml", "config/feeds.json"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return load_feeds_from(&p);
        }
    }
    Ok(Vec::new())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<Vec<FeedConfig>> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[feeds]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported feeds format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedConfig>> {
    #[derive(Deserialize)]
    struct TomlFeeds {
        feeds: Vec<RawFeed>,
    }
    let v: TomlFeeds = toml::from_str(s)?;
    Ok(clean_feeds(v.feeds))
}

fn parse_json(s: &str) -> Result<Vec<FeedConfig>> {
    let v: Vec<RawFeed> = serde_json::from_str(s)?;
    Ok(clean_feeds(v))
}

/// Entries without a url are skipped; a missing name becomes `UNKNOWN_SOURCE`.
fn clean_feeds(items: Vec<RawFeed>) -> Vec<FeedConfig> {
    items
        .into_iter()
        .filter_map(|f| {
            let url = f.url.map(|u| u.trim().to_string()).unwrap_or_default();
            if url.is_empty() {
                return None;
            }
            let name = f
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
            Some(FeedConfig { name, url })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_toml_shapes() {
        let json = r#"[
            {"name": " BBC ", "url": "https://feeds.bbci.co.uk/news/rss.xml"},
            {"name": "NoUrl"},
            {"url": "https://example.test/feed"},
            {"name": "Blank", "url": "  "}
        ]"#;
        let out = parse_json(json).unwrap();
        assert_eq!(
            out,
            vec![
                FeedConfig {
                    name: "BBC".into(),
                    url: "https://feeds.bbci.co.uk/news/rss.xml".into()
                },
                FeedConfig {
                    name: UNKNOWN_SOURCE.into(),
                    url: "https://example.test/feed".into()
                },
            ]
        );

        let toml = r#"
[[feeds]]
name = "36氪"
url = "https://36kr.com/feed"
"#;
        let t = parse_toml(toml).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].name, "36氪");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_feeds("{ nope", "").is_err());
    }
}
