//! Application state shared across all handlers and middleware.

use std::net::IpAddr;
use std::sync::Arc;

use axum::extract::FromRef;

use sessionward_auth::SessionManager;
use sessionward_database::DatabasePool;

use crate::extractors::TrustedProxies;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session lifecycle engine.
    pub session_manager: Arc<SessionManager>,
    /// Database pool, when running against PostgreSQL. Only used by the
    /// health check.
    pub db_pool: Option<DatabasePool>,
    /// Peers whose forwarding headers [`ClientIp`](crate::extractors::ClientIp) believes.
    pub trusted_proxies: TrustedProxies,
}

impl AppState {
    /// Creates state around an engine. No proxy is trusted.
    pub fn new(session_manager: Arc<SessionManager>) -> Self {
        Self {
            session_manager,
            db_pool: None,
            trusted_proxies: TrustedProxies::default(),
        }
    }

    /// Attaches the pool checked by `/health`.
    pub fn with_db_pool(mut self, pool: DatabasePool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Sets the reverse proxies allowed to forward the client address.
    pub fn with_trusted_proxies(mut self, proxies: impl IntoIterator<Item = IpAddr>) -> Self {
        self.trusted_proxies = TrustedProxies::new(proxies);
        self
    }
}

impl FromRef<AppState> for TrustedProxies {
    fn from_ref(state: &AppState) -> Self {
        state.trusted_proxies.clone()
    }
}
