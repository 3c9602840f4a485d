//! Message persistence against the `messages` and `group_messages` tables.

use async_trait::async_trait;
use sqlx::PgPool;

use hubline_core::error::{AppError, ErrorKind};
use hubline_core::result::AppResult;
use hubline_core::traits::{MessageStore, NewGroupMessage, NewPrivateMessage};

/// Repository writing chat messages.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for ChatRepository {
    async fn save_private_message(&self, msg: &NewPrivateMessage) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO messages (from_id, to_id, content, type, timestamp) \
             VALUES ($1, $2, $3, 'private', $4)",
        )
        .bind(msg.from)
        .bind(msg.to)
        .bind(&msg.content)
        .bind(msg.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to save private message", e)
        })?;
        Ok(())
    }

    /// Inserts only when the sender is the group's creator or an accepted
    /// member; otherwise fails with `Forbidden` and nothing is written.
    async fn save_group_message(&self, msg: &NewGroupMessage) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO group_messages (group_id, sender_id, content, timestamp) \
             SELECT $1, $2, $3, $4 \
             WHERE EXISTS (SELECT 1 FROM groups WHERE id = $1 AND creator_id = $2) \
                OR EXISTS (SELECT 1 FROM group_memberships \
                           WHERE group_id = $1 AND user_id = $2 AND status = 'accepted')",
        )
        .bind(msg.group_id)
        .bind(msg.sender_id)
        .bind(&msg.content)
        .bind(msg.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to save group message", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::forbidden(format!(
                "User {} is not a member of group {}",
                msg.sender_id, msg.group_id
            )));
        }
        Ok(())
    }
}
