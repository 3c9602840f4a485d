//! Message validation rules.
//!
//! A frame that fails any rule is dropped by the reader; the connection
//! stays open.

use hubline_core::error::AppError;

use super::types::{ChatMessage, MessageKind};

/// Checks the raw text frame before decoding.
pub fn validate_frame(raw: &str, max_size: usize) -> Result<(), AppError> {
    if raw.len() > max_size {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Checks that a decoded envelope carries what its kind requires.
///
/// `from` is not checked here because the reader stamps it from the
/// authenticated connection. Unknown kinds pass; the hub logs and drops them.
pub fn validate_message(msg: &ChatMessage) -> Result<(), AppError> {
    if msg.kind.is_empty() {
        return Err(AppError::validation("Missing message type"));
    }

    match msg.kind {
        MessageKind::Private => {
            match msg.to {
                Some(to) if to.is_valid() => {}
                _ => return Err(AppError::validation("Private message requires a recipient")),
            }
            require_content(msg)
        }
        MessageKind::GroupMessage => {
            match msg.group_id {
                Some(group) if group.is_valid() => {}
                _ => return Err(AppError::validation("Group message requires a group id")),
            }
            require_content(msg)
        }
        _ => Ok(()),
    }
}

/// Only the empty string counts as missing; whitespace is delivered as sent.
fn require_content(msg: &ChatMessage) -> Result<(), AppError> {
    if msg.content.is_empty() {
        return Err(AppError::validation("Message content is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use hubline_core::error::ErrorKind;
    use hubline_core::types::{GroupId, UserId};

    use crate::message::serializer::deserialize_inbound;

    #[test]
    fn test_frame_size_limit() {
        let big = "x".repeat(33);
        let err = validate_frame(&big, 32).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(validate_frame("{}", 32).is_ok());
        assert!(validate_frame("   ", 32).is_err());
    }

    #[test]
    fn test_private_requires_recipient_and_content() {
        assert!(validate_message(&ChatMessage::private(UserId(1), UserId(2), "hi")).is_ok());
        assert!(validate_message(&ChatMessage::private(UserId(1), UserId(0), "hi")).is_err());
        assert!(validate_message(&ChatMessage::private(UserId(1), UserId(2), "")).is_err());

        let no_to = deserialize_inbound(r#"{"type":"private","content":"hi"}"#).unwrap();
        assert!(validate_message(&no_to).is_err());
    }

    #[test]
    fn test_group_requires_group_id() {
        assert!(validate_message(&ChatMessage::group(UserId(1), GroupId(3), "x")).is_ok());
        let msg = deserialize_inbound(r#"{"type":"group_message","content":"x"}"#).unwrap();
        assert!(validate_message(&msg).is_err());
    }

    #[test]
    fn test_missing_type_rejected_unknown_type_passes() {
        let msg = deserialize_inbound(r#"{"to":2,"content":"x"}"#).unwrap();
        assert!(validate_message(&msg).is_err());

        let msg = deserialize_inbound(r#"{"type":"typing"}"#).unwrap();
        assert!(validate_message(&msg).is_ok());
    }

    #[test]
    fn test_whitespace_content_is_accepted() {
        assert!(validate_message(&ChatMessage::private(UserId(1), UserId(2), "  ")).is_ok());
        assert!(validate_message(&ChatMessage::group(UserId(1), GroupId(3), "\n")).is_ok());
    }
}
