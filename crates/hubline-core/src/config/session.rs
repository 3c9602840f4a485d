//! Session resolution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How WebSocket handshakes are tied to a user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie set by the auth service.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// How long a resolved session stays memoised, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Maximum memoised sessions.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: u64,
    /// Accept an unauthenticated `?userId=` parameter. Development only.
    #[serde(default)]
    pub allow_query_user_id: bool,
}

impl SessionConfig {
    /// Memoisation TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cache_ttl_seconds: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
            allow_query_user_id: false,
        }
    }
}

fn default_cookie_name() -> String {
    "session_id".to_string()
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_cache_max_entries() -> u64 {
    10_000
}
