//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use hubline_core::config::AppConfig;
use hubline_core::traits::SessionResolver;
use hubline_database::DatabasePool;
use hubline_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Real-time router
    pub realtime: RealtimeEngine,
    /// Session token → user (cached)
    pub sessions: Arc<dyn SessionResolver>,
    /// PostgreSQL pool, absent when running on in-memory collaborators
    pub database: Option<DatabasePool>,
    /// When the state was built, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state, stamping the start time.
    pub fn new(
        config: Arc<AppConfig>,
        realtime: RealtimeEngine,
        sessions: Arc<dyn SessionResolver>,
        database: Option<DatabasePool>,
    ) -> Self {
        Self {
            config,
            realtime,
            sessions,
            database,
            started_at: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("realtime", &self.realtime)
            .field("database", &self.database.is_some())
            .finish()
    }
}
