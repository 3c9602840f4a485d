//! Reader and writer pumps for one WebSocket connection.
//!
//! The reader runs on the caller's task and the writer on a spawned one.
//! Whichever ends first takes the other down: the writer cancels the
//! reader through a token, and the reader's unregister closes the queue the
//! writer is draining.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hubline_core::config::RealtimeConfig;
use hubline_core::result::AppResult;
use hubline_core::types::{ConnectionId, UserId};

use crate::hub::HubHandle;
use crate::message::{serializer, validator, ChatMessage};
use crate::metrics::RealtimeMetrics;

use super::handle::ConnectionHandle;
use super::heartbeat::HeartbeatConfig;
use super::transport::{Frame, TransportError};

/// An accepted connection that has not started pumping yet.
pub struct Connection {
    handle: Arc<ConnectionHandle>,
    outbound: mpsc::Receiver<String>,
    heartbeat: HeartbeatConfig,
    max_message_size: usize,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("conn_id", &self.handle.id)
            .field("user_id", &self.handle.user_id)
            .finish()
    }
}

impl Connection {
    /// Creates the connection state for an authenticated user.
    pub fn new(user_id: UserId, config: &RealtimeConfig, metrics: Arc<RealtimeMetrics>) -> Self {
        let (handle, outbound) = ConnectionHandle::new(user_id, config.send_queue_capacity);
        Self {
            handle,
            outbound,
            heartbeat: HeartbeatConfig::from(config),
            max_message_size: config.max_message_size,
            metrics,
        }
    }

    /// The handle to register with the hub.
    pub fn handle(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Pumps frames until either side ends, then unregisters.
    ///
    /// The handle must already be registered. Returns once both pumps have
    /// stopped.
    pub async fn run<S, E, K>(self, hub: HubHandle, stream: S, sink: K)
    where
        S: Stream<Item = Result<Frame, E>> + Unpin,
        E: Display,
        K: Sink<Frame> + Unpin + Send + 'static,
        K::Error: Display,
    {
        let Self {
            handle,
            outbound,
            heartbeat,
            max_message_size,
            metrics,
        } = self;

        let writer_done = CancellationToken::new();
        let writer = tokio::spawn(write_pump(
            sink,
            outbound,
            heartbeat,
            handle.id,
            writer_done.clone(),
        ));

        let reader = Reader {
            handle: &handle,
            hub: &hub,
            metrics: &metrics,
            pong_wait: heartbeat.pong_wait,
            max_message_size,
        };
        let reason = reader.run(stream, &writer_done).await;
        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            reason = %reason,
            "Connection closing"
        );

        hub.unregister(handle.clone()).await;

        if let Err(e) = writer.await {
            warn!(conn_id = %handle.id, error = %e, "Writer task failed");
        }
    }
}

/// Why the reader stopped.
#[derive(Debug)]
enum ReadEnd {
    PeerClosed,
    WriterEnded,
    HubStopped,
    Transport(TransportError),
}

impl Display for ReadEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PeerClosed => f.write_str("peer closed"),
            Self::WriterEnded => f.write_str("writer ended"),
            Self::HubStopped => f.write_str("hub stopped"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

struct Reader<'a> {
    handle: &'a ConnectionHandle,
    hub: &'a HubHandle,
    metrics: &'a RealtimeMetrics,
    pong_wait: std::time::Duration,
    max_message_size: usize,
}

impl Reader<'_> {
    async fn run<S, E>(&self, mut stream: S, writer_done: &CancellationToken) -> ReadEnd
    where
        S: Stream<Item = Result<Frame, E>> + Unpin,
        E: Display,
    {
        loop {
            // any frame from the peer renews the deadline
            let next = tokio::select! {
                _ = writer_done.cancelled() => return ReadEnd::WriterEnded,
                next = time::timeout(self.pong_wait, stream.next()) => next,
            };

            let frame = match next {
                Err(_) => return ReadEnd::Transport(TransportError::ReadTimeout),
                Ok(None) => return ReadEnd::PeerClosed,
                Ok(Some(Err(e))) => return ReadEnd::Transport(TransportError::Read(e.to_string())),
                Ok(Some(Ok(frame))) => frame,
            };

            match frame {
                Frame::Text(text) => {
                    self.metrics.frame_received();
                    let msg = match decode(&text, self.handle.user_id, self.max_message_size) {
                        Ok(msg) => msg,
                        Err(e) => {
                            self.metrics.frame_rejected();
                            debug!(
                                conn_id = %self.handle.id,
                                user_id = %self.handle.user_id,
                                error = %e,
                                "Inbound frame dropped"
                            );
                            continue;
                        }
                    };
                    if self.hub.dispatch(msg).await.is_err() {
                        return ReadEnd::HubStopped;
                    }
                }
                Frame::Close => return ReadEnd::PeerClosed,
                Frame::Binary(_) | Frame::Ping(_) | Frame::Pong(_) => {}
            }
        }
    }
}

/// Size-checks, decodes and validates a text frame, then stamps the sender.
fn decode(text: &str, sender: UserId, max_size: usize) -> AppResult<ChatMessage> {
    validator::validate_frame(text, max_size)?;
    let msg = serializer::deserialize_inbound(text)?;
    validator::validate_message(&msg)?;
    Ok(msg.normalize(sender))
}

async fn write_pump<K>(
    mut sink: K,
    mut outbound: mpsc::Receiver<String>,
    heartbeat: HeartbeatConfig,
    conn_id: ConnectionId,
    done: CancellationToken,
) where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    let _done = done.drop_guard();
    let mut ticker = heartbeat.ping_ticker();

    loop {
        let result = tokio::select! {
            payload = outbound.recv() => match payload {
                Some(text) => write_frame(&mut sink, Frame::Text(text), heartbeat.write_wait).await,
                None => {
                    if let Err(e) = write_frame(&mut sink, Frame::Close, heartbeat.write_wait).await {
                        debug!(conn_id = %conn_id, error = %e, "Close frame not sent");
                    }
                    break;
                }
            },
            _ = ticker.tick() => write_frame(&mut sink, Frame::Ping(Vec::new()), heartbeat.write_wait).await,
        };

        if let Err(e) = result {
            debug!(conn_id = %conn_id, error = %e, "Write failed, stopping writer");
            break;
        }
    }

    let _ = time::timeout(heartbeat.write_wait, sink.close()).await;
    debug!(conn_id = %conn_id, "Writer stopped");
}

async fn write_frame<K>(sink: &mut K, frame: Frame, wait: std::time::Duration) -> Result<(), TransportError>
where
    K: Sink<Frame> + Unpin,
    K::Error: Display,
{
    match time::timeout(wait, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(TransportError::Write(e.to_string())),
        Err(_) => Err(TransportError::WriteTimeout),
    }
}
