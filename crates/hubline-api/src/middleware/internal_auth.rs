//! Bearer-token guard for the `/internal` routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use hubline_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Rejects requests whose `Authorization: Bearer` token does not match
/// `server.internal_token`. An empty configured token disables the routes.
pub async fn require_internal_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state.config.server.internal_token.as_str();
    if expected.is_empty() {
        return Err(AppError::not_found("Internal API is disabled").into());
    }

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    if !constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        return Err(AppError::forbidden("Invalid internal token").into());
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
