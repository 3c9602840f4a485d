//! Notification dispatcher: pushes notifications to online users.

use tracing::{debug, warn};

use hubline_core::result::AppResult;
use hubline_core::types::UserId;

use crate::hub::HubHandle;
use crate::message::Notification;

/// Delivers notifications over the socket, at most once.
///
/// The notification record is persisted by whoever produced it, so an
/// offline recipient simply reads it on their next page load. There is no
/// retry and no offline queue here.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    /// Hub that owns the connection map
    hub: HubHandle,
}

impl NotificationDispatcher {
    /// Create a new dispatcher
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }

    /// Dispatch a notification to a specific user.
    ///
    /// Whether the user is online is decided inside the hub loop; offline
    /// is a silent no-op.
    pub async fn dispatch_to_user(
        &self,
        notification: &Notification,
        recipient: UserId,
    ) -> AppResult<()> {
        self.hub.notify(notification, recipient).await?;
        debug!(
            recipient = %recipient,
            kind = %notification.kind,
            "Notification handed to hub"
        );
        Ok(())
    }

    /// Dispatch to multiple users, each copy addressed to its recipient.
    ///
    /// Stops at the first failure, which only happens once the hub is gone.
    pub async fn dispatch_to_users(
        &self,
        notification: &Notification,
        recipients: &[UserId],
    ) -> AppResult<()> {
        for &recipient in recipients {
            let mut copy = notification.clone();
            copy.recipient_id = Some(recipient);
            if let Err(e) = self.hub.notify(&copy, recipient).await {
                warn!(recipient = %recipient, error = %e, "Notification fan-out aborted");
                return Err(e);
            }
        }
        Ok(())
    }
}
