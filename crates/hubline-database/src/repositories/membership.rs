//! Group membership and chat permission lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use hubline_core::error::{AppError, ErrorKind};
use hubline_core::result::AppResult;
use hubline_core::traits::MembershipOracle;
use hubline_core::types::{GroupId, UserId};

/// Read-only repository over `groups`, `group_memberships` and `followers`.
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipOracle for MembershipRepository {
    /// Creator first, then accepted members by join time.
    async fn group_members(&self, group_id: GroupId) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM ( \
                 SELECT g.creator_id AS user_id, 0 AS ord, g.created_at AS joined_at \
                 FROM groups g WHERE g.id = $1 \
                 UNION ALL \
                 SELECT gm.user_id, 1 AS ord, gm.created_at AS joined_at \
                 FROM group_memberships gm \
                 JOIN groups g ON g.id = gm.group_id \
                 WHERE gm.group_id = $1 AND gm.status = 'accepted' AND gm.user_id <> g.creator_id \
             ) members \
             ORDER BY ord, joined_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load group members", e))
    }

    /// True when either user follows the other with an accepted request.
    async fn can_users_chat(&self, from: UserId, to: UserId) -> AppResult<bool> {
        if from == to {
            return Ok(true);
        }
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM followers \
                 WHERE status = 'accepted' \
                   AND ((follower_id = $1 AND followed_id = $2) \
                     OR (follower_id = $2 AND followed_id = $1)) \
             )",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check chat permission", e))
    }

    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>> {
        sqlx::query_scalar::<_, GroupId>(
            "SELECT id FROM groups WHERE creator_id = $1 \
             UNION \
             SELECT group_id FROM group_memberships WHERE user_id = $1 AND status = 'accepted'",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user groups", e))
    }
}
