//! Response DTOs.

use serde::{Deserialize, Serialize};

use hubline_core::types::UserId;
use hubline_realtime::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Seconds since the process started serving.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Database status: `connected`, `unreachable` or `disabled`.
    pub database: String,
    /// Whether the hub control loop is running.
    pub hub_running: bool,
    /// Users with a live connection.
    pub online_users: Vec<UserId>,
    /// Groups currently cached.
    pub cached_groups: usize,
    /// Router counters.
    pub metrics: MetricsSnapshot,
}

/// Response to an accepted internal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedResponse {
    /// Always `accepted`; delivery is best-effort.
    pub status: String,
}

impl Default for AcceptedResponse {
    fn default() -> Self {
        Self {
            status: "accepted".to_string(),
        }
    }
}
