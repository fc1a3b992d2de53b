// src/api.rs
//! Serve mode: the last rendered page and its report over HTTP.

use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::pipeline::PipelineOutput;

const NOT_READY: &str = "no report yet; first refresh still running";

/// Latest pipeline output, swapped in whole after each refresh.
#[derive(Clone, Default)]
pub struct AppState {
    latest: Arc<RwLock<Option<Arc<PipelineOutput>>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, output: PipelineOutput) {
        let mut guard = self.latest.write().expect("rwlock poisoned");
        *guard = Some(Arc::new(output));
    }

    pub fn latest(&self) -> Option<Arc<PipelineOutput>> {
        self.latest.read().expect("rwlock poisoned").clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .route("/api/report", get(report))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Response {
    match state.latest() {
        Some(out) => Html(out.html.clone()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, NOT_READY).into_response(),
    }
}

#[derive(Serialize)]
struct ReportOut<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a crate::analyze::ScoreReport,
}

async fn report(State(state): State<AppState>) -> Response {
    match state.latest() {
        Some(out) => Json(ReportOut {
            generated_at: out.generated_at,
            report: &out.report,
        })
        .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, NOT_READY).into_response(),
    }
}
