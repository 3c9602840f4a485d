//! Membership oracle: who belongs to a group, and who may talk to whom.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{GroupId, UserId};

/// Source of truth for group composition and chat permissions.
#[async_trait]
pub trait MembershipOracle: Send + Sync + 'static {
    /// Current members of a group, in a stable order (creator first).
    async fn group_members(&self, group_id: GroupId) -> AppResult<Vec<UserId>>;

    /// Whether `from` may open a private conversation with `to`.
    async fn can_users_chat(&self, from: UserId, to: UserId) -> AppResult<bool>;

    /// Groups the user currently belongs to.
    async fn groups_for_user(&self, user_id: UserId) -> AppResult<Vec<GroupId>>;
}
