//! Application builder: wires router, middleware and state into an Axum app.

use std::future::Future;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use hubline_core::error::AppError;

use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
}

/// Serves until `shutdown` resolves, stopping the real-time engine first.
///
/// Open WebSockets are closed by the engine shutdown, which lets the
/// graceful HTTP shutdown complete.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let engine = state.realtime.clone();
    let app = build_app(state);

    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "Hubline server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown signal received");
            if let Err(e) = engine.shutdown().await {
                tracing::warn!(error = %e, "Real-time engine shutdown failed");
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}
