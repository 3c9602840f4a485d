//! # hubline-api
//!
//! HTTP layer for Hubline built on Axum.
//!
//! Provides the WebSocket upgrade, health endpoints, the bearer-guarded
//! internal routes other services use to push notifications, invalidate
//! group caches and route chat, plus error mapping and request logging.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
