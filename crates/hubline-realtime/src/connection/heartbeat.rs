//! Keepalive and deadline settings for one connection.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use hubline_core::config::RealtimeConfig;

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_period: Duration,
    /// Read deadline, renewed by every inbound frame
    pub pong_wait: Duration,
    /// Deadline for a single outbound write
    pub write_wait: Duration,
}

impl HeartbeatConfig {
    /// Ticker that first fires one period from now.
    pub fn ping_ticker(&self) -> Interval {
        let mut ticker = time::interval_at(Instant::now() + self.ping_period, self.ping_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_period: config.ping_period(),
            pong_wait: config.pong_wait(),
            write_wait: config.write_wait(),
        }
    }
}
