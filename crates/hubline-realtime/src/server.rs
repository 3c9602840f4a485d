//! Top-level real-time engine that ties together all subsystems.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, Stream};
use tracing::{info, warn};

use hubline_cache::GroupMemberCache;
use hubline_core::config::RealtimeConfig;
use hubline_core::result::AppResult;
use hubline_core::traits::{MembershipOracle, MessageStore};
use hubline_core::types::UserId;

use crate::connection::{Connection, Frame};
use crate::hub::{Hub, HubHandle};
use crate::metrics::RealtimeMetrics;
use crate::notification::NotificationDispatcher;
use crate::presence;

/// Central real-time engine that coordinates the hub, the group member
/// cache and notification delivery.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Handle to the hub control loop.
    pub hub: HubHandle,
    /// Group member cache shared with the hub.
    pub groups: Arc<GroupMemberCache>,
    /// Notification dispatcher.
    pub notifications: NotificationDispatcher,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    oracle: Arc<dyn MembershipOracle>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("hub", &self.hub)
            .field("groups", &self.groups)
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine and spawns the hub control loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: RealtimeConfig,
        oracle: Arc<dyn MembershipOracle>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let groups = Arc::new(GroupMemberCache::new(oracle.clone()));
        let (hub, handle) = Hub::new(
            config.hub_queue_capacity,
            groups.clone(),
            oracle.clone(),
            store,
            metrics.clone(),
        );
        tokio::spawn(hub.run());

        info!(
            send_queue = config.send_queue_capacity,
            hub_queue = config.hub_queue_capacity,
            "Real-time engine initialized"
        );

        Self {
            notifications: NotificationDispatcher::new(handle.clone()),
            hub: handle,
            groups,
            metrics,
            oracle,
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Serves one authenticated WebSocket until it closes.
    ///
    /// Registers the connection, announces the user to their group peers in
    /// the background, then runs the pumps on the current task.
    pub async fn serve_connection<S, E, K>(&self, user_id: UserId, stream: S, sink: K) -> AppResult<()>
    where
        S: Stream<Item = Result<Frame, E>> + Unpin,
        E: Display,
        K: Sink<Frame> + Unpin + Send + 'static,
        K::Error: Display,
    {
        let connection = Connection::new(user_id, &self.config, self.metrics.clone());
        self.hub.register(connection.handle().clone()).await?;

        tokio::spawn(presence::announce_online(
            self.hub.clone(),
            self.oracle.clone(),
            user_id,
        ));

        connection.run(self.hub.clone(), stream, sink).await;
        Ok(())
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> AppResult<()> {
        info!("Shutting down real-time engine");
        if let Err(e) = self.hub.shutdown().await {
            warn!(error = %e, "Hub already stopped");
        }
        info!("Real-time engine shut down");
        Ok(())
    }
}
