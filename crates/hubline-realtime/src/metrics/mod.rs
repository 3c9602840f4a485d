//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters, updated lock-free from the hub and the pumps.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections ever registered
    connections_total: AtomicU64,
    /// Currently registered connections
    connections_active: AtomicU64,
    /// Registrations that displaced an earlier connection of the same user
    connections_replaced: AtomicU64,
    /// Connections evicted because their outbound queue was full
    connections_evicted: AtomicU64,
    /// Inbound frames read
    frames_received: AtomicU64,
    /// Inbound frames dropped by validation
    frames_rejected: AtomicU64,
    /// Chat messages persisted and fanned out
    messages_routed: AtomicU64,
    /// Chat messages dropped (not allowed, not a member, unknown kind)
    messages_dropped: AtomicU64,
    /// Store or membership lookups that failed during dispatch
    dispatch_failures: AtomicU64,
    /// Payloads accepted by an outbound queue
    payloads_queued: AtomicU64,
    /// Notifications queued for an online user
    notifications_delivered: AtomicU64,
    /// Notifications for users not connected
    notifications_skipped: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self, active: usize) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.set_active(active);
    }

    pub(crate) fn connection_closed(&self, active: usize) {
        self.set_active(active);
    }

    pub(crate) fn connection_replaced(&self) {
        self.connections_replaced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_evicted(&self, active: usize) {
        self.connections_evicted.fetch_add(1, Ordering::Relaxed);
        self.set_active(active);
    }

    pub(crate) fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn message_routed(&self) {
        self.messages_routed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn dispatch_failed(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn payload_queued(&self) {
        self.payloads_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn notification_delivered(&self) {
        self.notifications_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn notification_skipped(&self) {
        self.notifications_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn set_active(&self, active: usize) {
        self.connections_active
            .store(active as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_replaced: self.connections_replaced.load(Ordering::Relaxed),
            connections_evicted: self.connections_evicted.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            messages_routed: self.messages_routed.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            payloads_queued: self.payloads_queued.load(Ordering::Relaxed),
            notifications_delivered: self.notifications_delivered.load(Ordering::Relaxed),
            notifications_skipped: self.notifications_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_total: u64,
    /// Currently registered connections
    pub connections_active: u64,
    /// Registrations that displaced an earlier connection
    pub connections_replaced: u64,
    /// Connections evicted for a full queue
    pub connections_evicted: u64,
    /// Inbound frames read
    pub frames_received: u64,
    /// Inbound frames rejected
    pub frames_rejected: u64,
    /// Chat messages routed
    pub messages_routed: u64,
    /// Chat messages dropped
    pub messages_dropped: u64,
    /// Failed store or membership lookups
    pub dispatch_failures: u64,
    /// Payloads queued
    pub payloads_queued: u64,
    /// Notifications delivered
    pub notifications_delivered: u64,
    /// Notifications skipped for offline users
    pub notifications_skipped: u64,
}
