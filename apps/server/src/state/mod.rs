//! # Application State
//!
//! Explicit state injected into handlers through axum's `State`; no
//! module-level singletons anywhere. Everything a handler can touch is
//! visible in this struct.

pub mod session;

use std::sync::Arc;

use kasa_db::Database;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use session::SessionRegistry;

/// Shared application state.
///
/// Cloning is cheap: the database pool is reference-counted and the
/// rest sits behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Builds the state from loaded config and a connected database.
    pub fn new(config: ServerConfig, db: Database) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));

        AppState {
            db,
            config: Arc::new(config),
            jwt,
            sessions: SessionRegistry::new(),
        }
    }
}
