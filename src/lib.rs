// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod corpus;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod render;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{ScoreReport, Scorer, Tokenizer};
pub use crate::api::create_router;
pub use crate::config::{ScoringConfig, Settings};
pub use crate::corpus::{Corpus, Item, RankedResult};
pub use crate::pipeline::{Pipeline, PipelineOutput};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "clean_news=info,ingest=info,scoring=info,pipeline=info,warn";

/// Initialize tracing once. `RUST_LOG` wins over the default filter.
/// `json` switches the fmt layer to JSON lines.
pub fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialized: {e}");
    }
}
