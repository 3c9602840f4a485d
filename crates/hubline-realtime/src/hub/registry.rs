//! The hub control loop: connection map ownership and message routing.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use hubline_cache::GroupMemberCache;
use hubline_core::traits::{MembershipOracle, MessageStore};
use hubline_core::types::UserId;

use crate::connection::{ConnectionHandle, SendOutcome};
use crate::message::serializer;
use crate::message::{ChatMessage, MessageKind};
use crate::metrics::RealtimeMetrics;

use super::command::{DeliveryKind, HubCommand};
use super::handle::HubHandle;

/// Single owner of the user → connection map.
///
/// Commands are applied one at a time in arrival order. Persistence and
/// membership lookups are awaited inline, so a slow store delays routing
/// for everyone; writes to connection queues never wait.
pub struct Hub {
    /// Incoming commands
    commands: mpsc::Receiver<HubCommand>,
    /// At most one live connection per user
    connections: HashMap<UserId, Arc<ConnectionHandle>>,
    /// Group → members
    cache: Arc<GroupMemberCache>,
    /// Chat permission checks
    oracle: Arc<dyn MembershipOracle>,
    /// Message persistence
    store: Arc<dyn MessageStore>,
    /// Counters
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("connections", &self.connections.len())
            .finish()
    }
}

impl Hub {
    /// Creates a hub and the handle used to reach it.
    ///
    /// Nothing is processed until [`Hub::run`] is spawned.
    pub fn new(
        capacity: usize,
        cache: Arc<GroupMemberCache>,
        oracle: Arc<dyn MembershipOracle>,
        store: Arc<dyn MessageStore>,
        metrics: Arc<RealtimeMetrics>,
    ) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = HubHandle::new(tx, cache.clone());
        let hub = Self {
            commands: rx,
            connections: HashMap::new(),
            cache,
            oracle,
            store,
            metrics,
        };
        (hub, handle)
    }

    /// Processes commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Hub control loop started");

        while let Some(command) = self.commands.recv().await {
            if let HubCommand::Shutdown(ack) = command {
                self.stop();
                let _ = ack.send(());
                info!("Hub shut down");
                return;
            }
            self.apply(command).await;
        }

        self.stop();
        info!("Hub control loop ended");
    }

    async fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register(handle) => self.register(handle),
            HubCommand::Unregister(handle) => self.unregister(handle),
            HubCommand::Dispatch(msg) => self.dispatch(msg).await,
            HubCommand::Deliver {
                user_id,
                payload,
                kind,
            } => {
                let delivered = self.deliver(user_id, payload);
                if kind == DeliveryKind::Notification {
                    if delivered {
                        self.metrics.notification_delivered();
                    } else {
                        self.metrics.notification_skipped();
                        debug!(user_id = %user_id, "Recipient not connected, notification skipped");
                    }
                }
            }
            HubCommand::ConnectedUsers(reply) => {
                let mut users: Vec<UserId> = self.connections.keys().copied().collect();
                users.sort();
                let _ = reply.send(users);
            }
            HubCommand::IsOnline { user_id, reply } => {
                let _ = reply.send(self.connections.contains_key(&user_id));
            }
            HubCommand::Shutdown(ack) => {
                self.stop();
                let _ = ack.send(());
            }
        }
    }

    fn register(&mut self, handle: Arc<ConnectionHandle>) {
        let user_id = handle.user_id;
        let conn_id = handle.id;

        if let Some(previous) = self.connections.insert(user_id, handle) {
            if previous.id != conn_id {
                previous.close();
                self.metrics.connection_replaced();
                info!(
                    user_id = %user_id,
                    old_conn_id = %previous.id,
                    conn_id = %conn_id,
                    "Existing connection replaced"
                );
            }
        }

        self.metrics.connection_opened(self.connections.len());
        info!(user_id = %user_id, conn_id = %conn_id, "Connection registered");
    }

    fn unregister(&mut self, handle: Arc<ConnectionHandle>) {
        let is_current = self
            .connections
            .get(&handle.user_id)
            .is_some_and(|current| current.id == handle.id);

        if is_current {
            self.connections.remove(&handle.user_id);
            self.metrics.connection_closed(self.connections.len());
            info!(user_id = %handle.user_id, conn_id = %handle.id, "Connection unregistered");
        } else {
            debug!(user_id = %handle.user_id, conn_id = %handle.id, "Stale unregister ignored");
        }

        handle.close();
    }

    async fn dispatch(&mut self, msg: ChatMessage) {
        match msg.kind {
            MessageKind::Private => self.route_private(msg).await,
            MessageKind::GroupMessage => self.route_group(msg).await,
            _ => {
                warn!(kind = %msg.kind, from = ?msg.from, "Dropping message of unsupported type");
                self.metrics.message_dropped();
            }
        }
    }

    async fn route_private(&mut self, msg: ChatMessage) {
        let Some(record) = msg.as_private_record() else {
            warn!("Private message without sender or recipient dropped");
            self.metrics.message_dropped();
            return;
        };
        let (from, to) = (record.from, record.to);

        match self.oracle.can_users_chat(from, to).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(from = %from, to = %to, "Users are not allowed to chat, message dropped");
                self.metrics.message_dropped();
                return;
            }
            Err(e) => {
                error!(from = %from, to = %to, error = %e, "Chat permission check failed");
                self.metrics.dispatch_failed();
                return;
            }
        }

        if let Err(e) = self.store.save_private_message(&record).await {
            error!(from = %from, to = %to, error = %e, "Failed to persist private message");
            self.metrics.dispatch_failed();
            return;
        }

        let payload = match serializer::serialize_message(&msg) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Failed to serialize private message");
                return;
            }
        };

        if from != to {
            self.deliver(from, payload.clone());
        }
        self.deliver(to, payload);
        self.metrics.message_routed();
        debug!(from = %from, to = %to, "Private message routed");
    }

    async fn route_group(&mut self, msg: ChatMessage) {
        let Some(record) = msg.as_group_record() else {
            warn!("Group message without sender or group dropped");
            self.metrics.message_dropped();
            return;
        };
        let (group_id, sender) = (record.group_id, record.sender_id);

        if let Err(e) = self.store.save_group_message(&record).await {
            error!(group_id = %group_id, from = %sender, error = %e, "Failed to persist group message");
            self.metrics.dispatch_failed();
            return;
        }

        let members = match self.cache.resolve(group_id).await {
            Ok(members) => members,
            Err(e) => {
                error!(group_id = %group_id, error = %e, "Failed to resolve group members");
                self.metrics.dispatch_failed();
                return;
            }
        };

        // fan-out only; the store decides what is recorded
        if !members.contains(&sender) {
            warn!(group_id = %group_id, from = %sender, "Sender is not a group member, message not delivered");
            self.metrics.message_dropped();
            return;
        }

        let mut copy = msg;
        let mut delivered = 0usize;
        for &member in members.iter() {
            if !self.connections.contains_key(&member) {
                continue;
            }
            copy.to = Some(member);
            match serializer::serialize_message(&copy) {
                Ok(payload) => {
                    if self.deliver(member, payload) {
                        delivered += 1;
                    }
                }
                Err(e) => error!(group_id = %group_id, error = %e, "Failed to serialize group message"),
            }
        }

        self.metrics.message_routed();
        debug!(
            group_id = %group_id,
            from = %sender,
            members = members.len(),
            delivered,
            "Group message routed"
        );
    }

    /// Enqueues a payload for one user. A full queue evicts the connection.
    fn deliver(&mut self, user_id: UserId, payload: String) -> bool {
        let outcome = match self.connections.get(&user_id) {
            Some(conn) => conn.send(payload),
            None => return false,
        };

        match outcome {
            SendOutcome::Queued => {
                self.metrics.payload_queued();
                true
            }
            SendOutcome::Full => {
                if let Some(conn) = self.connections.remove(&user_id) {
                    conn.close();
                    warn!(
                        user_id = %user_id,
                        conn_id = %conn.id,
                        "Outbound queue full, disconnecting slow client"
                    );
                }
                self.metrics.connection_evicted(self.connections.len());
                false
            }
            SendOutcome::Closed => {
                if let Some(conn) = self.connections.remove(&user_id) {
                    conn.close();
                    debug!(user_id = %user_id, conn_id = %conn.id, "Dropped connection with closed queue");
                }
                self.metrics.connection_closed(self.connections.len());
                false
            }
        }
    }

    fn stop(&mut self) {
        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            if let HubCommand::Register(handle) | HubCommand::Unregister(handle) = command {
                handle.close();
            }
        }

        for (_, conn) in self.connections.drain() {
            conn.close();
        }
        self.metrics.connection_closed(0);
    }
}
