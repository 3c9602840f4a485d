//! Session resolution for the WebSocket handshake.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserId;

/// Maps an out-of-band credential (session cookie value) to a user.
#[async_trait]
pub trait SessionResolver: Send + Sync + 'static {
    /// Returns the user owning the session, or `None` for unknown/expired tokens.
    async fn resolve(&self, token: &str) -> AppResult<Option<UserId>>;
}
