// src/pipeline.rs
//! fetch → score → render, once or on an interval.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::analyze::{ScoreReport, Scorer};
use crate::api::AppState;
use crate::config::{ScoringConfig, Settings};
use crate::ingest::{
    self,
    config::{load_feeds_default, FeedConfig},
    providers::{build_http_client, RssFeedSource},
    types::FeedSource,
};
use crate::render;

/// One finished run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: ScoreReport,
    pub html: String,
    pub generated_at: DateTime<Utc>,
}

pub struct Pipeline {
    scorer: Scorer,
    sources: Vec<Arc<dyn FeedSource>>,
    output_path: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(scorer: Scorer, sources: Vec<Arc<dyn FeedSource>>) -> Self {
        Self {
            scorer,
            sources,
            output_path: None,
        }
    }

    /// Also write the rendered page to `path` after every successful run.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Feeds and scoring vocabulary from their default locations, HTTP sources.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let feeds = load_feeds_default()?;
        if feeds.is_empty() {
            warn!("no feeds configured");
        }
        let scoring = ScoringConfig::load_default()?;
        let client = build_http_client(settings.fetch_timeout)?;
        Ok(Self::new(Scorer::new(scoring), http_sources(&feeds, &client))
            .with_output_path(&settings.output_path))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// `Ok(None)` when no source produced data; nothing is rendered then.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<Option<PipelineOutput>> {
        let corpus = ingest::run_once(&self.sources).await;
        if corpus.is_empty() {
            error!("no feed data fetched; skipping scoring and rendering");
            return Ok(None);
        }

        let items = corpus.item_count();
        let report = self.scorer.score(corpus, now);
        counter!("pipeline_items_scored_total").increment(items as u64);

        if let Some((top, count)) = report.top_vocabulary.first() {
            info!(target: "scoring", top = %top, count, "top trending token");
        }

        let html = render::render_html(&report, now);
        if let Some(path) = &self.output_path {
            render::write_page(&html, path)?;
        }

        counter!("pipeline_runs_total").increment(1);
        gauge!("pipeline_last_run_ts").set(now.timestamp().max(0) as f64);

        Ok(Some(PipelineOutput {
            report,
            html,
            generated_at: now,
        }))
    }
}

pub fn http_sources(feeds: &[FeedConfig], client: &reqwest::Client) -> Vec<Arc<dyn FeedSource>> {
    feeds
        .iter()
        .map(|f| {
            Arc::new(RssFeedSource::from_url(&f.name, &f.url, client.clone()))
                as Arc<dyn FeedSource>
        })
        .collect()
}

/// Re-run the pipeline every `interval` and publish each output to `state`.
pub fn spawn_refresh_scheduler(
    pipeline: Arc<Pipeline>,
    interval: Duration,
    state: AppState,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match pipeline.run_once(Utc::now()).await {
                Ok(Some(out)) => {
                    info!(
                        target: "pipeline",
                        sources = out.report.ranked.len(),
                        "refresh published"
                    );
                    state.publish(out);
                }
                Ok(None) => {}
                Err(e) => error!(target: "pipeline", error = ?e, "refresh failed"),
            }
        }
    })
}
