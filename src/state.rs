use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;
use tower_cookies::Key;

use crate::config::{Config, SessionBackend};
use crate::session::{self, MemorySessionStore, PgSessionStore, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie_key: Key,
}

impl AppState {
    /// Builds the state, picking the session backend named in the config.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Memory => Arc::new(MemorySessionStore::new(config.session_ttl_seconds)),
            SessionBackend::Postgres => {
                Arc::new(PgSessionStore::new(pool.clone(), config.session_ttl_seconds))
            }
        };
        let cookie_key = session::cookie_key(&config.session_secret);

        Self {
            pool,
            config,
            sessions,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
