use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tilerace_core::{CacheStats, SanitizedConfig};

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<String>,
    pub turn_timeout_secs: u64,
}

/// GET /api/v1/providers
///
/// Registered providers in registration (tie-break) order.
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProviderListResponse> {
    let pipeline = state.pipeline();
    Json(ProviderListResponse {
        providers: pipeline
            .providers()
            .iter()
            .map(|p| p.name().to_string())
            .collect(),
        turn_timeout_secs: pipeline.turn_timeout().as_secs(),
    })
}

/// GET /api/v1/cache/stats
pub async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.cache().stats().await)
}

/// DELETE /api/v1/cache
///
/// Drop every cached verdict. Counters are kept.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    let cache = state.cache();
    cache.clear().await;
    Json(cache.stats().await)
}

/// GET /metrics
pub async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
