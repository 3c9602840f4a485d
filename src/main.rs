//! Hubline Server: real-time chat, presence and notification router
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt};

use hubline_api::AppState;
use hubline_cache::SessionCache;
use hubline_core::config::AppConfig;
use hubline_core::error::AppError;
use hubline_database::{ChatRepository, DatabasePool, MembershipRepository, SessionRepository};
use hubline_realtime::RealtimeEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("HUBLINE_ENV").unwrap_or_else(|_| "development".to_string());
    let dir = std::env::var("HUBLINE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Hubline v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database pool + adapters ─────────────────────────
    let db_pool = DatabasePool::connect_lazy(&config.database)?;
    let membership = Arc::new(MembershipRepository::new(db_pool.pool().clone()));
    let chat = Arc::new(ChatRepository::new(db_pool.pool().clone()));
    let sessions = Arc::new(SessionCache::new(
        Arc::new(SessionRepository::new(db_pool.pool().clone())),
        &config.session,
    ));

    // ── Step 2: Real-time engine ─────────────────────────────────
    let engine = RealtimeEngine::start(config.realtime.clone(), membership, chat);

    // ── Step 3: HTTP server ──────────────────────────────────────
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    if config.server.internal_token.is_empty() {
        tracing::warn!("server.internal_token is empty; /internal routes are disabled");
    }

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(
        Arc::new(config),
        engine,
        sessions,
        Some(db_pool.clone()),
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(hubline_api::app::serve(listener, state, async move {
        let _ = stop_rx.await;
    }));

    // ── Step 4: Wait for shutdown ────────────────────────────────
    tokio::select! {
        result = &mut server => {
            db_pool.close().await;
            return result
                .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?;
        }
        _ = shutdown_signal() => {}
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(grace, server).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed during shutdown"),
        Err(_) => tracing::warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed"),
    }

    db_pool.close().await;
    tracing::info!("Hubline stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
