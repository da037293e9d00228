#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bb8_redis::redis::{ErrorKind, IntoConnectionInfo, RedisError};
use http_body_util::BodyExt;
use sqlx::postgres::PgConnectOptions;
use tower::ServiceExt;

use authgate_api::auth::jwt::JwtConfig;
use authgate_api::auth::password::{PasswordConfig, PasswordHasher};
use authgate_api::auth::service::AuthService;
use authgate_api::config::{DatabaseConfig, LogFormat, RedisConfig, ServerConfig};
use authgate_api::metrics::Metrics;
use authgate_api::router::build_app_router;
use authgate_api::state::AppState;
use authgate_cache::memory::InMemorySessionStore;
use authgate_cache::{CacheError, SessionManager, SessionStore};
use authgate_core::types::DbId;
use authgate_db::memory::InMemoryUserStore;
use authgate_db::models::user::{CreateUser, User};
use authgate_db::{StoreError, UserStore};

pub const TEST_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses the minimum Argon2 work factor so tests stay fast.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        log_format: LogFormat::Pretty,
        database: DatabaseConfig {
            connect: PgConnectOptions::new().host("localhost").database("unused"),
            max_connections: 1,
        },
        redis: RedisConfig {
            connection: "redis://localhost:6379".into_connection_info().unwrap(),
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
        },
        password: PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// A running application together with handles on its backing stores.
pub struct TestApp {
    pub router: Router,
    pub metrics: Arc<Metrics>,
    pub sessions: Arc<dyn SessionStore>,
}

impl TestApp {
    /// A fresh clone of the router, ready for `oneshot`.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router backed by in-memory stores.
///
/// Returns the user store too so tests can inspect persisted rows.
pub fn build_test_app() -> (TestApp, Arc<InMemoryUserStore>) {
    let users = Arc::new(InMemoryUserStore::new());
    let app = build_test_app_with(users.clone(), Arc::new(InMemorySessionStore::new()));
    (app, users)
}

/// Build the full application router over the given stores.
///
/// This goes through the same [`build_app_router`] as `main.rs`, so tests
/// exercise the production middleware stack.
pub fn build_test_app_with(
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
) -> TestApp {
    let config = test_config();
    let metrics = Arc::new(Metrics::new().unwrap());
    let hasher = PasswordHasher::new(&config.password).unwrap();
    let auth = AuthService::new(
        Arc::clone(&users),
        SessionManager::new(Arc::clone(&sessions)),
        hasher,
        config.jwt.clone(),
        Arc::clone(&metrics),
    )
    .unwrap();

    let state = AppState {
        auth: Arc::new(auth),
        users,
        sessions: Arc::clone(&sessions),
        metrics: Arc::clone(&metrics),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        metrics,
        sessions,
    }
}

// ---------------------------------------------------------------------------
// Failing collaborators
// ---------------------------------------------------------------------------

/// Session cache whose every operation fails as if Redis were down.
pub struct UnavailableSessionStore;

fn redis_down() -> CacheError {
    RedisError::from((ErrorKind::IoError, "connection refused")).into()
}

#[async_trait]
impl SessionStore for UnavailableSessionStore {
    async fn put(&self, _: &str, _: DbId, _: Duration) -> Result<(), CacheError> {
        Err(redis_down())
    }

    async fn get(&self, _: &str) -> Result<Option<DbId>, CacheError> {
        Err(redis_down())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(redis_down())
    }
}

/// Credential store whose every operation fails as if Postgres were down.
pub struct UnavailableUserStore;

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn create(&self, _: &CreateUser) -> Result<User, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn find_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
