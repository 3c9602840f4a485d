//! Durable message persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::{GroupId, UserId};

/// A private message about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrivateMessage {
    /// Authenticated sender.
    pub from: UserId,
    /// Recipient.
    pub to: UserId,
    /// Message body.
    pub content: String,
    /// Server-normalised send time.
    pub sent_at: DateTime<Utc>,
}

/// A group message about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroupMessage {
    /// Target group.
    pub group_id: GroupId,
    /// Authenticated sender.
    pub sender_id: UserId,
    /// Message body.
    pub content: String,
    /// Server-normalised send time.
    pub sent_at: DateTime<Utc>,
}

/// Persists chat messages before they are delivered live.
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a private message.
    async fn save_private_message(&self, msg: &NewPrivateMessage) -> AppResult<()>;

    /// Persist a group message.
    async fn save_group_message(&self, msg: &NewGroupMessage) -> AppResult<()>;
}
