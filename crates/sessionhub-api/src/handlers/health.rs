//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{
    ApiResponse, CacheResponse, DetailedHealthResponse, HealthResponse,
};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let database = match &state.database {
        Some(db) => match db.health_check().await {
            Ok(true) => "connected",
            _ => "unavailable",
        },
        None => "not_configured",
    };

    let config = state.sessions.config();
    let stats = state.sessions.cache_stats();

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: (if database == "unavailable" { "degraded" } else { "ok" }).to_string(),
        store: config.store.to_string(),
        database: database.to_string(),
        cache: CacheResponse {
            capacity: config.cache_capacity.max(1),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
        },
    }))
}
