//! Axum middleware stack.

pub mod internal_auth;
pub mod logging;
