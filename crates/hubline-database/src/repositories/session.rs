//! Session lookup for WebSocket handshakes.

use async_trait::async_trait;
use sqlx::PgPool;

use hubline_core::error::{AppError, ErrorKind};
use hubline_core::result::AppResult;
use hubline_core::traits::SessionResolver;
use hubline_core::types::UserId;

/// Repository over the auth service's `sessions` table.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionResolver for SessionRepository {
    async fn resolve(&self, token: &str) -> AppResult<Option<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve session", e))
    }
}
