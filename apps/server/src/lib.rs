//! # Kasa Server Library
//!
//! Core library for the Kasa POS HTTP API.
//!
//! ## Module Organization
//! ```text
//! kasa_server/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── Environment configuration
//! ├── auth.rs         ◄─── JWT + argon2, Claims extractor
//! ├── error.rs        ◄─── ApiError for handlers
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState (db, config, jwt, sessions)
//! │   └── session.rs  ◄─── Per-session cart registry
//! └── handlers/       ◄─── One module per resource
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::EnvFilter;

use kasa_db::{Database, DbConfig};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Runs the server until a shutdown signal arrives.
///
/// ## Startup Sequence
/// 1. Initialize tracing (env-filtered, `RUST_LOG` aware)
/// 2. Load configuration from the environment
/// 3. Connect SQLite and run pending migrations
/// 4. Build the AppState and router
/// 5. Serve with graceful shutdown on Ctrl+C / SIGTERM
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Kasa POS server");

    let config = ServerConfig::load()?;
    info!(
        port = config.http_port,
        db = %config.database_path,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database connected and migrations applied");

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let state = AppState::new(config, db);
    let app = handlers::router(state);

    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kasa=trace` - Trace for kasa crates only
/// - Default: INFO level, sqlx at WARN
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kasa=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
