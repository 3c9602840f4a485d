//! Chat envelope and notification payload definitions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use hubline_core::traits::{NewGroupMessage, NewPrivateMessage};
use hubline_core::types::{EventId, GroupId, NotificationId, UserId};

/// Discriminator carried in the `type` field of a chat envelope.
///
/// Unrecognised strings are kept verbatim so the hub can log what it
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    /// One-to-one chat.
    Private,
    /// Group chat.
    GroupMessage,
    /// Server-originated presence signal.
    UserOnline,
    /// Anything else, including the empty string.
    Other(String),
}

impl MessageKind {
    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Private => "private",
            Self::GroupMessage => "group_message",
            Self::UserOnline => "user_online",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the `type` field was missing or blank.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Other(raw) if raw.trim().is_empty())
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for MessageKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "private" => Self::Private,
            "group_message" => Self::GroupMessage,
            "user_online" => Self::UserOnline,
            _ => Self::Other(raw),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat envelope exchanged with clients.
///
/// ```json
/// {"type":"private","from":1,"to":2,"content":"hi","timestamp":"2026-01-01T10:00:00Z"}
/// ```
///
/// Inbound, every field is optional so a malformed frame can be rejected by
/// [`validate_message`](super::validator::validate_message) instead of
/// failing deserialization. `from` is never trusted: the reader overwrites
/// it with the connection's user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message kind.
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<UserId>,
    /// Recipient (private), or the member a group copy was addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<UserId>,
    /// Target group.
    #[serde(
        rename = "groupId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<GroupId>,
    /// Body text.
    #[serde(default)]
    pub content: String,
    /// Send time; unparsable input deserializes as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// A private message from `from` to `to`.
    pub fn private(from: UserId, to: UserId, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Private,
            from: Some(from),
            to: Some(to),
            content: content.into(),
            ..Default::default()
        }
    }

    /// A group message from `from` to `group_id`.
    pub fn group(from: UserId, group_id: GroupId, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::GroupMessage,
            from: Some(from),
            group_id: Some(group_id),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Presence signal: `user_id` came online, seen through `group_id`.
    pub fn user_online(user_id: UserId, group_id: GroupId) -> Self {
        Self {
            kind: MessageKind::UserOnline,
            from: Some(user_id),
            group_id: Some(group_id),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Stamps the authenticated sender and fills in a missing timestamp.
    pub fn normalize(mut self, sender: UserId) -> Self {
        self.from = Some(sender);
        self.timestamp.get_or_insert_with(Utc::now);
        self
    }

    /// Persistence record for a private message, if the envelope has the
    /// required fields.
    pub fn as_private_record(&self) -> Option<NewPrivateMessage> {
        Some(NewPrivateMessage {
            from: self.from?,
            to: self.to?,
            content: self.content.clone(),
            sent_at: self.timestamp.unwrap_or_else(Utc::now),
        })
    }

    /// Persistence record for a group message.
    pub fn as_group_record(&self) -> Option<NewGroupMessage> {
        Some(NewGroupMessage {
            group_id: self.group_id?,
            sender_id: self.from?,
            content: self.content.clone(),
            sent_at: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.with_timezone(&Utc)))
}

/// Unsolicited push to a single user (follow request, group invite, ...).
///
/// The record is persisted by the workflow that produced it; delivery over
/// the socket is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Persisted record id, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NotificationId>,
    /// Addressee; filled in from the routing recipient when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<UserId>,
    /// Who triggered it.
    pub sender_id: UserId,
    /// Display name of the sender.
    #[serde(default)]
    pub sender_nickname: String,
    /// Related group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Related event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// Notification type, e.g. `group_invite`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable text.
    #[serde(default)]
    pub message: String,
    /// Read flag as stored.
    #[serde(default)]
    pub seen: bool,
    /// Creation time.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
