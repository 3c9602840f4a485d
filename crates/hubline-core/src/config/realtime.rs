//! Real-time router configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Real-time (WebSocket) router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound queue. A full queue evicts
    /// the connection.
    #[serde(default = "default_send_queue")]
    pub send_queue_capacity: usize,
    /// Capacity of the hub's command channel.
    #[serde(default = "default_hub_queue")]
    pub hub_queue_capacity: usize,
    /// Deadline for a single frame write, in seconds.
    #[serde(default = "default_write_wait")]
    pub write_wait_seconds: u64,
    /// Read deadline in seconds; renewed by every frame from the peer.
    #[serde(default = "default_pong_wait")]
    pub pong_wait_seconds: u64,
    /// Ping interval in seconds. Defaults to 9/10 of the pong wait.
    #[serde(default)]
    pub ping_period_seconds: Option<u64>,
    /// Maximum inbound frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl RealtimeConfig {
    /// Write deadline.
    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_seconds)
    }

    /// Read deadline.
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_seconds)
    }

    /// Interval between pings. Shorter than the read deadline once
    /// [`RealtimeConfig::validate`] has passed.
    pub fn ping_period(&self) -> Duration {
        match self.ping_period_seconds {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => self.pong_wait() * 9 / 10,
        }
    }

    /// Rejects timings and capacities the router cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.pong_wait_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.pong_wait_seconds must be greater than zero",
            ));
        }
        if self.write_wait_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.write_wait_seconds must be greater than zero",
            ));
        }
        if let Some(ping) = self.ping_period_seconds {
            if ping == 0 || ping >= self.pong_wait_seconds {
                return Err(AppError::configuration(format!(
                    "realtime.ping_period_seconds must be between 1 and {} (pong wait)",
                    self.pong_wait_seconds - 1
                )));
            }
        }
        if self.send_queue_capacity == 0 || self.hub_queue_capacity == 0 {
            return Err(AppError::configuration(
                "realtime queue capacities must be greater than zero",
            ));
        }
        if self.max_message_size == 0 {
            return Err(AppError::configuration(
                "realtime.max_message_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            send_queue_capacity: default_send_queue(),
            hub_queue_capacity: default_hub_queue(),
            write_wait_seconds: default_write_wait(),
            pong_wait_seconds: default_pong_wait(),
            ping_period_seconds: None,
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_send_queue() -> usize {
    256
}

fn default_hub_queue() -> usize {
    1024
}

fn default_write_wait() -> u64 {
    10
}

fn default_pong_wait() -> u64 {
    300
}

fn default_max_message_size() -> usize {
    512 * 1024
}
