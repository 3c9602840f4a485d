//! Request DTOs.

use serde::{Deserialize, Serialize};

use hubline_core::types::UserId;
use hubline_realtime::Notification;

/// Body of `POST /internal/notifications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    /// Who should receive the push.
    pub recipient_id: UserId,
    /// The persisted notification record.
    pub notification: Notification,
}

/// Query parameters accepted by the WebSocket upgrade.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Session token, when no cookie is sent.
    pub token: Option<String>,
    /// Development-only identity override.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}
