//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use hubline_core::types::{ConnectionId, UserId};

/// Result of a non-blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Payload accepted by the outbound queue.
    Queued,
    /// Queue at capacity; the payload was dropped.
    Full,
    /// Queue already closed.
    Closed,
}

/// Producer side of one connection's outbound queue.
///
/// The hub holds one of these per registered user. The writer pump owns
/// the receiving half and ends once every payload queued before
/// [`ConnectionHandle::close`] has been drained.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// Outbound queue; `None` once closed
    sender: Mutex<Option<mpsc::Sender<String>>>,
    closed: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle with a bounded queue of `capacity` payloads.
    pub fn new(user_id: UserId, capacity: usize) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Arc::new(Self {
            id: ConnectionId::new(),
            user_id,
            sender: Mutex::new(Some(tx)),
            closed: AtomicBool::new(false),
        });
        (handle, rx)
    }

    /// Enqueue a serialized payload without waiting.
    pub fn send(&self, payload: String) -> SendOutcome {
        if self.is_closed() {
            return SendOutcome::Closed;
        }
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            return SendOutcome::Closed;
        };
        match sender.try_send(payload) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => SendOutcome::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => SendOutcome::Closed,
        }
    }

    /// Close the outbound queue.
    ///
    /// Returns `true` only for the call that actually closed it; later calls
    /// are no-ops.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        true
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_until_full() {
        let (handle, mut rx) = ConnectionHandle::new(UserId(1), 2);
        assert_eq!(handle.send("a".into()), SendOutcome::Queued);
        assert_eq!(handle.send("b".into()), SendOutcome::Queued);
        assert_eq!(handle.send("c".into()), SendOutcome::Full);

        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert_eq!(handle.send("d".into()), SendOutcome::Queued);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_drains() {
        let (handle, mut rx) = ConnectionHandle::new(UserId(1), 4);
        handle.send("last".into());

        assert!(handle.close());
        assert!(!handle.close());
        assert_eq!(handle.send("late".into()), SendOutcome::Closed);

        assert_eq!(rx.recv().await.as_deref(), Some("last"));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_receiver_dropped_reports_closed() {
        let (handle, rx) = ConnectionHandle::new(UserId(3), 1);
        drop(rx);
        assert_eq!(handle.send("x".into()), SendOutcome::Closed);
        assert!(!handle.is_closed());
    }
}
