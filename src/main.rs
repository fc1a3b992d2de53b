//! clean-news binary entrypoint.
//!
//! `clean-news` (or `clean-news run`) fetches, scores, and writes the page once.
//! `clean-news serve` keeps refreshing on an interval and serves the latest page over HTTP.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{error, info};

use clean_news::{
    api::AppState, config::settings, create_router, init_tracing, metrics::Metrics, pipeline,
    Pipeline, Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing(settings::log_json_from_env());
    let settings = Settings::from_env();

    let mode = std::env::args().nth(1);
    match mode.as_deref() {
        None | Some("run") => run(&settings).await,
        Some("serve") => serve(settings).await,
        Some(other) => bail!("unknown command `{other}` (expected `run` or `serve`)"),
    }
}

async fn run(settings: &Settings) -> Result<()> {
    let pipeline = Pipeline::from_settings(settings)?;
    info!(sources = pipeline.source_count(), "starting run");

    match pipeline.run_once(Utc::now()).await? {
        Some(out) => {
            info!(
                path = %settings.output_path.display(),
                sources = out.report.ranked.len(),
                "page written"
            );
        }
        None => error!("nothing rendered"),
    }
    Ok(())
}

async fn serve(settings: Settings) -> Result<()> {
    let metrics = Metrics::install()?;
    let pipeline = Arc::new(Pipeline::from_settings(&settings)?);
    let state = AppState::new();

    let _refresh =
        pipeline::spawn_refresh_scheduler(pipeline, settings.refresh_interval, state.clone());

    let app = create_router(state).merge(metrics.router());
    let listener = tokio::net::TcpListener::bind(settings.serve_addr)
        .await
        .with_context(|| format!("bind {}", settings.serve_addr))?;
    info!(addr = %settings.serve_addr, "serving");

    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
