//! Route definitions for the Hubline HTTP API.
//!
//! Health endpoints live under `/api`, collaborator endpoints under
//! `/internal`, and the WebSocket upgrade at `/ws`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let internal = internal_routes().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::internal_auth::require_internal_token,
    ));

    Router::new()
        .nest("/api", health_routes())
        .nest("/internal", internal)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Liveness and detailed status
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Notification push, group cache control, chat injection
fn internal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            post(handlers::internal::push_notification),
        )
        .route(
            "/groups/{id}/cache/invalidate",
            post(handlers::internal::invalidate_group_cache),
        )
        .route(
            "/groups/{id}/cache/warm",
            post(handlers::internal::warm_group_cache),
        )
        .route("/messages", post(handlers::internal::dispatch_message))
}
