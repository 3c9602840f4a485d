//! Transport-neutral WebSocket frames.
//!
//! The pumps are generic over any `Stream`/`Sink` of [`Frame`]s so the HTTP
//! layer can adapt its socket type and tests can drive them with channels.

use thiserror::Error;

/// A WebSocket frame as seen by the pumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text
    Text(String),
    /// Binary payload (ignored inbound)
    Binary(Vec<u8>),
    /// Ping
    Ping(Vec<u8>),
    /// Pong
    Pong(Vec<u8>),
    /// Close
    Close,
}

/// Failure writing to or reading from the peer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The sink rejected the frame.
    #[error("write failed: {0}")]
    Write(String),
    /// The write did not complete within the write deadline.
    #[error("write deadline exceeded")]
    WriteTimeout,
    /// Nothing arrived within the read deadline.
    #[error("read deadline exceeded")]
    ReadTimeout,
    /// The stream yielded an error.
    #[error("read failed: {0}")]
    Read(String),
}
