//! # hubline-realtime
//!
//! Real-time fan-out router for the social platform. Provides:
//!
//! - Per-connection reader/writer pumps with read and write deadlines
//! - A single-owner hub that registers connections and routes chat
//! - Private and group chat with persistence before delivery
//! - Best-effort notification push
//! - Online announcements to group peers

pub mod connection;
pub mod hub;
pub mod message;
pub mod metrics;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod notification;
pub mod presence;
pub mod server;

pub use connection::{Connection, ConnectionHandle, Frame};
pub use hub::{Hub, HubHandle};
pub use message::{ChatMessage, MessageKind, Notification};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use notification::NotificationDispatcher;
pub use server::RealtimeEngine;
