// tests/pipeline_e2e.rs
//
// Fixture feeds → fetch → score → render → file, without the network.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use clean_news::ingest::providers::RssFeedSource;
use clean_news::ingest::types::{FeedSource, RawEntry};
use clean_news::{Pipeline, Scorer};

const RSS_XML: &str = include_str!("fixtures/rss_mixed.xml");
const ATOM_XML: &str = include_str!("fixtures/atom.xml");
const BROKEN_XML: &str = include_str!("fixtures/broken.xml");

struct Unreachable;

#[async_trait]
impl FeedSource for Unreachable {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        bail!("timed out fetching https://unreachable.example.test/rss")
    }
    fn name(&self) -> &str {
        "Unreachable"
    }
}

fn fixture_sources() -> Vec<Arc<dyn FeedSource>> {
    vec![
        Arc::new(RssFeedSource::from_fixture("Mixed Wire", RSS_XML)),
        Arc::new(Unreachable),
        Arc::new(RssFeedSource::from_fixture("Atom Desk", ATOM_XML)),
        Arc::new(RssFeedSource::from_fixture("Gateway", BROKEN_XML)),
    ]
}

#[tokio::test]
async fn fixtures_are_scored_rendered_and_written() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("site").join("index.html");
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let pipeline = Pipeline::new(Scorer::default(), fixture_sources()).with_output_path(&out_path);
    assert_eq!(pipeline.source_count(), 4);

    let out = pipeline
        .run_once(now)
        .await
        .expect("pipeline ok")
        .expect("some sources produced data");

    // failing sources are skipped; the rest keep config order
    assert_eq!(
        out.report.ranked.source_names().collect::<Vec<_>>(),
        vec!["Mixed Wire", "Atom Desk"]
    );
    assert_eq!(out.generated_at, now);

    // "market" is the one token every English headline shares
    assert_eq!(out.report.top_vocabulary[0].0, "market");

    let wire = out.report.ranked.get("Mixed Wire").unwrap();
    assert_eq!(wire.len(), 4);
    // the two boosted, same-day headlines outrank the rest
    let top_two: Vec<&str> = wire[..2].iter().map(|i| i.title.as_str()).collect();
    assert!(top_two.contains(&"Breaking: market rally lifts tech stocks"));
    assert!(top_two.iter().any(|t| t.starts_with("突发")));
    assert!(wire[..2].iter().all(|i| i.score.unwrap_or(0) >= 110));
    assert!(wire.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(wire.iter().all(|i| i.score.is_some()));

    let written = std::fs::read_to_string(&out_path).expect("page written");
    assert_eq!(written, out.html);
    assert!(written.contains("Mixed Wire"));
    assert!(!written.contains("Unreachable"));
}

#[tokio::test]
async fn nothing_fetched_means_nothing_written() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("index.html");
    let sources: Vec<Arc<dyn FeedSource>> = vec![Arc::new(Unreachable)];

    let pipeline = Pipeline::new(Scorer::default(), sources).with_output_path(&out_path);
    let out = pipeline.run_once(Utc::now()).await.expect("pipeline ok");

    assert!(out.is_none());
    assert!(!out_path.exists());
}
