// src/ingest/mod.rs
pub mod config;
pub mod parse;
pub mod providers;
pub mod types;

use crate::corpus::{Corpus, Item};
use crate::ingest::types::FeedSource;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::task::JoinSet;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_sources_ok_total", "Feeds fetched and parsed.");
        describe_counter!(
            "ingest_provider_errors_total",
            "Feed fetch/parse errors (source skipped)."
        );
        describe_counter!("ingest_entries_total", "Entries parsed from feeds.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!(
            "ingest_last_run_ts",
            "Unix ts when the fetch layer last ran."
        );
    });
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z!][^>]*>").unwrap());
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());

    // Tags go first so that decoded `&lt;b&gt;` survives as literal text.
    let stripped = re_tags.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    re_ws.replace_all(&decoded, " ").trim().to_string()
}

/// Fetch every source concurrently and assemble a `Corpus` in source order.
/// A failing source is logged and left out; it never affects the others.
pub async fn run_once(sources: &[Arc<dyn FeedSource>]) -> Corpus {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for (idx, src) in sources.iter().enumerate() {
        let src = Arc::clone(src);
        set.spawn(async move { (idx, src.fetch_entries().await) });
    }

    let mut fetched: Vec<Option<Vec<Item>>> = (0..sources.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, Ok(entries))) => {
                counter!("ingest_sources_ok_total").increment(1);
                fetched[idx] = Some(parse::parse_entries(entries));
            }
            Ok((idx, Err(e))) => {
                tracing::warn!(
                    target: "ingest",
                    error = ?e,
                    source = sources[idx].name(),
                    "feed skipped"
                );
                counter!("ingest_provider_errors_total").increment(1);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, "feed task aborted");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
    }

    let mut corpus = Corpus::new();
    for (src, items) in sources.iter().zip(fetched) {
        if let Some(items) = items {
            corpus.insert(src.name(), items);
        }
    }

    let now = chrono::Utc::now().timestamp().max(0);
    gauge!("ingest_last_run_ts").set(now as f64);
    tracing::info!(
        target: "ingest",
        sources_ok = corpus.len(),
        sources_total = sources.len(),
        items = corpus.item_count(),
        "fetch finished"
    );

    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_collapses_ws_and_entities() {
        let s = "  Hello,&nbsp;&nbsp; world!!!  ";
        assert_eq!(normalize_text(s), "Hello, world!!!");
    }

    #[test]
    fn normalize_text_strips_tags_but_not_comparisons() {
        assert_eq!(normalize_text("<p>a<br/>b</p>"), "a b");
        assert_eq!(normalize_text("x < 3 and y > 2"), "x < 3 and y > 2");
        assert_eq!(normalize_text("&lt;b&gt;bold&lt;/b&gt;"), "<b>bold</b>");
    }

    #[test]
    fn normalize_text_keeps_cjk() {
        assert_eq!(normalize_text("<p>突发：\n市场 大涨</p>"), "突发： 市场 大涨");
    }
}
