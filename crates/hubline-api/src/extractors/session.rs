//! `SessionUser` extractor: resolves the caller's identity for the upgrade.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use hubline_core::error::AppError;
use hubline_core::types::UserId;

use crate::dto::request::WsQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user opening a WebSocket.
///
/// Looks for the session cookie first, then a `token` query parameter.
/// With `session.allow_query_user_id` enabled, a bare `userId` query
/// parameter is trusted as a last resort.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser(pub UserId);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = &state.config.session;
        let jar = CookieJar::from_headers(&parts.headers);
        let query = Query::<WsQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        let token = jar
            .get(&session.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .or(query.token)
            .filter(|token| !token.is_empty());

        if let Some(token) = token {
            match state.sessions.resolve(&token).await? {
                Some(user_id) => return Ok(Self(user_id)),
                None => debug!("Session token did not resolve"),
            }
        }

        if session.allow_query_user_id {
            if let Some(user_id) = query
                .user_id
                .as_deref()
                .and_then(|raw| raw.parse::<UserId>().ok())
                .filter(|id| id.is_valid())
            {
                warn!(user_id = %user_id, "Accepting unauthenticated userId query parameter");
                return Ok(Self(user_id));
            }
        }

        Err(AppError::unauthorized("No valid session").into())
    }
}
