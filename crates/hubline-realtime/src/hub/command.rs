//! Commands processed by the hub control loop.

use std::sync::Arc;

use tokio::sync::oneshot;

use hubline_core::types::UserId;

use crate::connection::ConnectionHandle;
use crate::message::ChatMessage;

/// What a pre-serialized payload pushed to one user is, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Server-built chat envelope (presence, direct push)
    Direct,
    /// Notification
    Notification,
}

/// One unit of work for the control loop, applied in FIFO order.
pub(crate) enum HubCommand {
    Register(Arc<ConnectionHandle>),
    Unregister(Arc<ConnectionHandle>),
    Dispatch(ChatMessage),
    Deliver {
        user_id: UserId,
        payload: String,
        kind: DeliveryKind,
    },
    ConnectedUsers(oneshot::Sender<Vec<UserId>>),
    IsOnline {
        user_id: UserId,
        reply: oneshot::Sender<bool>,
    },
    Shutdown(oneshot::Sender<()>),
}
