//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
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
        Some(pool) => match pool.health_check().await {
            Ok(true) => "connected",
            Ok(false) => "unreachable",
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                "unreachable"
            }
        },
        None => "disabled",
    };

    let hub_running = !state.realtime.hub.is_closed();
    let online_users = state.realtime.hub.connected_users().await.unwrap_or_default();
    let status = if hub_running && database != "unreachable" {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        hub_running,
        online_users,
        cached_groups: state.realtime.groups.len(),
        metrics: state.realtime.metrics.snapshot(),
    }))
}
