//! JSON serialization for WebSocket payloads.

use super::types::{ChatMessage, Notification};

/// Serialize a chat envelope for the wire.
pub fn serialize_message(msg: &ChatMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(msg)
}

/// Serialize a notification for the wire.
pub fn serialize_notification(notification: &Notification) -> Result<String, serde_json::Error> {
    serde_json::to_string(notification)
}

/// Deserialize an inbound chat envelope.
pub fn deserialize_inbound(text: &str) -> Result<ChatMessage, serde_json::Error> {
    serde_json::from_str(text)
}
