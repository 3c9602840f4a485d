//! Per-connection state and the reader/writer pumps.

pub mod handle;
pub mod heartbeat;
pub mod pump;
pub mod transport;

pub use handle::{ConnectionHandle, SendOutcome};
pub use heartbeat::HeartbeatConfig;
pub use pump::Connection;
pub use transport::{Frame, TransportError};
