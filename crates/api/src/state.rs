use std::sync::Arc;

use authgate_cache::SessionStore;
use authgate_db::UserStore;

use crate::auth::service::AuthService;
use crate::config::ServerConfig;
use crate::metrics::Metrics;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Registration and login workflows.
    pub auth: Arc<AuthService>,
    /// Credential store, probed by the health check.
    pub users: Arc<dyn UserStore>,
    /// Session cache, probed by the health check.
    pub sessions: Arc<dyn SessionStore>,
    pub metrics: Arc<Metrics>,
    /// Server configuration (token secret is read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
