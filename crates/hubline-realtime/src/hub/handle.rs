//! Cloneable front door to the hub control loop.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use hubline_cache::GroupMemberCache;
use hubline_core::error::AppError;
use hubline_core::result::AppResult;
use hubline_core::types::{GroupId, UserId};

use crate::connection::ConnectionHandle;
use crate::message::serializer;
use crate::message::{ChatMessage, Notification};

use super::command::{DeliveryKind, HubCommand};

/// Sends commands to a running [`Hub`](super::Hub).
///
/// Every method fails with `ServiceUnavailable` once the hub has shut down,
/// except [`HubHandle::unregister`], which then closes the queue itself.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    cache: Arc<GroupMemberCache>,
}

impl std::fmt::Debug for HubHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHandle")
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

impl HubHandle {
    pub(crate) fn new(commands: mpsc::Sender<HubCommand>, cache: Arc<GroupMemberCache>) -> Self {
        Self { commands, cache }
    }

    /// Adds a connection, replacing any earlier one for the same user.
    pub async fn register(&self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        self.send(HubCommand::Register(handle)).await
    }

    /// Removes a connection if it is still the registered one, and closes
    /// its queue either way.
    pub async fn unregister(&self, handle: Arc<ConnectionHandle>) {
        if self
            .commands
            .send(HubCommand::Unregister(handle.clone()))
            .await
            .is_err()
        {
            handle.close();
        }
    }

    /// Routes a validated, sender-stamped chat message.
    pub async fn dispatch(&self, msg: ChatMessage) -> AppResult<()> {
        self.send(HubCommand::Dispatch(msg)).await
    }

    /// Pushes a notification to `recipient` if connected; otherwise nothing
    /// happens.
    pub async fn notify(&self, notification: &Notification, recipient: UserId) -> AppResult<()> {
        let payload = if notification.recipient_id.is_some() {
            serializer::serialize_notification(notification)?
        } else {
            let mut addressed = notification.clone();
            addressed.recipient_id = Some(recipient);
            serializer::serialize_notification(&addressed)?
        };
        self.deliver(recipient, payload, DeliveryKind::Notification)
            .await
    }

    /// Pushes a server-built envelope to one user if connected.
    pub async fn send_to_user(&self, user_id: UserId, msg: &ChatMessage) -> AppResult<()> {
        let payload = serializer::serialize_message(msg)?;
        self.deliver(user_id, payload, DeliveryKind::Direct).await
    }

    async fn deliver(&self, user_id: UserId, payload: String, kind: DeliveryKind) -> AppResult<()> {
        self.send(HubCommand::Deliver {
            user_id,
            payload,
            kind,
        })
        .await
    }

    /// Drops a group's cached member list.
    pub fn invalidate_group_cache(&self, group_id: GroupId) {
        self.cache.invalidate(group_id);
    }

    /// Refetches a group's member list into the cache.
    pub async fn warm_group_cache(&self, group_id: GroupId) -> AppResult<()> {
        let members = self.cache.warm(group_id).await?;
        debug!(group_id = %group_id, count = members.len(), "Group member cache warmed");
        Ok(())
    }

    /// The group member cache this hub routes through.
    pub fn group_cache(&self) -> &Arc<GroupMemberCache> {
        &self.cache
    }

    /// Users with a registered connection, sorted.
    pub async fn connected_users(&self) -> AppResult<Vec<UserId>> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::ConnectedUsers(reply)).await?;
        rx.await.map_err(|_| stopped())
    }

    /// Whether `user_id` has a registered connection.
    pub async fn is_online(&self, user_id: UserId) -> AppResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::IsOnline { user_id, reply }).await?;
        rx.await.map_err(|_| stopped())
    }

    /// Closes every connection and stops the control loop.
    ///
    /// Resolves once the loop has closed all queues.
    pub async fn shutdown(&self) -> AppResult<()> {
        let (ack, rx) = oneshot::channel();
        self.send(HubCommand::Shutdown(ack)).await?;
        rx.await.map_err(|_| stopped())
    }

    /// Whether the control loop has gone away.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: HubCommand) -> AppResult<()> {
        self.commands.send(command).await.map_err(|_| stopped())
    }
}

fn stopped() -> AppError {
    AppError::service_unavailable("Hub is not running")
}
