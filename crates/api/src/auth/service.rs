//! The register and login workflows.
//!
//! Both are short linear sequences with a single failure exit per step:
//!
//! ```text
//! register: validate -> hash -> insert            -> respond
//! login:    validate -> lookup -> verify -> token -> session -> respond
//! ```
//!
//! Nothing is retried. The only swallowed failure is the session-cache write
//! during login; every store, hashing or signing failure ends the request.

use std::sync::Arc;

use authgate_cache::{Session, SessionManager};
use authgate_core::error::CoreError;
use authgate_core::validation::{validate_login, validate_registration};
use authgate_db::models::user::{CreateUser, UserResponse};
use authgate_db::{StoreError, UserStore};

use crate::auth::jwt::{generate_token, JwtConfig};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::metrics::Metrics;

/// Artifacts produced by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub session: Session,
    pub user: UserResponse,
}

/// Orchestrates the credential store, password hasher, token issuer and
/// session cache. Holds no mutable state; share it behind an `Arc`.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    hasher: PasswordHasher,
    jwt: JwtConfig,
    metrics: Arc<Metrics>,
    /// Verified against when the username is unknown, so that both login
    /// failures cost one hash verification.
    decoy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: SessionManager,
        hasher: PasswordHasher,
        jwt: JwtConfig,
        metrics: Arc<Metrics>,
    ) -> Result<Self, PasswordError> {
        let decoy_hash = hasher.hash("authgate-decoy-password")?;
        Ok(Self {
            users,
            sessions,
            hasher,
            jwt,
            metrics,
            decoy_hash,
        })
    }

    /// Register a user and return its public fields.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse, CoreError> {
        let username = username.trim();
        let email = email.trim();
        validate_registration(username, email, password)?;

        let password_hash = self
            .hasher
            .hash_blocking(password.to_string())
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to process password: {e}")))?;

        let input = CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        };
        let user = self.users.create(&input).await.map_err(|e| match e {
            StoreError::Conflict { constraint } => conflict_error(&constraint),
            other => CoreError::Internal(format!("Failed to create user: {other}")),
        })?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(UserResponse::from(&user))
    }

    /// Authenticate a user and issue a token and a session.
    ///
    /// An unknown username and a wrong password produce the same
    /// [`CoreError::Unauthorized`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, CoreError> {
        let username = username.trim();
        validate_login(username, password)?;

        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to look up user: {e}")))?;

        let stored_hash = user
            .as_ref()
            .map_or_else(|| self.decoy_hash.clone(), |u| u.password_hash.clone());
        let password_valid = self
            .hasher
            .verify_blocking(password.to_string(), stored_hash)
            .await;

        let user = match user {
            Some(user) if password_valid => user,
            _ => {
                self.metrics.record_auth_attempt(false);
                tracing::info!(username = %username, "Login rejected");
                return Err(CoreError::invalid_credentials());
            }
        };

        let token = generate_token(user.id, &user.username, &self.jwt)
            .map_err(|e| CoreError::Internal(format!("Failed to generate token: {e}")))?;

        let session = self.sessions.create_session(user.id).await;

        self.metrics.record_auth_attempt(true);
        tracing::info!(user_id = user.id, session_stored = session.stored, "Login succeeded");

        Ok(LoginOutcome {
            token,
            session,
            user: UserResponse::from(&user),
        })
    }

    /// All registered users, without password hashes.
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, CoreError> {
        let users = self
            .users
            .list()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to fetch users: {e}")))?;
        Ok(users.iter().map(UserResponse::from).collect())
    }
}

fn conflict_error(constraint: &str) -> CoreError {
    let message = match constraint {
        "uq_users_username" => "Username already exists",
        "uq_users_email" => "Email already exists",
        _ => "Username or email already exists",
    };
    CoreError::Conflict(message.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use authgate_cache::memory::InMemorySessionStore;
    use authgate_cache::{CacheError, SessionStore};
    use authgate_core::types::DbId;
    use authgate_db::memory::InMemoryUserStore;
    use authgate_db::models::user::User;
    use bb8_redis::redis::{ErrorKind, RedisError};

    use super::*;
    use crate::auth::jwt::validate_token;
    use crate::auth::password::PasswordConfig;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "service-test-secret".to_string(),
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    struct Fixture {
        service: AuthService,
        users: Arc<InMemoryUserStore>,
        sessions: Arc<InMemorySessionStore>,
        metrics: Arc<Metrics>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let service = AuthService::new(
            users.clone(),
            SessionManager::new(sessions.clone()),
            hasher(),
            jwt(),
            metrics.clone(),
        )
        .unwrap();
        Fixture {
            service,
            users,
            sessions,
            metrics,
        }
    }

    /// A session store that refuses every write.
    struct DownSessionStore;

    #[async_trait]
    impl SessionStore for DownSessionStore {
        async fn put(&self, _: &str, _: DbId, _: Duration) -> Result<(), CacheError> {
            Err(RedisError::from((ErrorKind::IoError, "connection refused")).into())
        }
        async fn get(&self, _: &str) -> Result<Option<DbId>, CacheError> {
            Ok(None)
        }
        async fn ping(&self) -> Result<(), CacheError> {
            Ok(())
        }
    }

    /// A user store whose every call fails.
    struct BrokenUserStore;

    #[async_trait]
    impl UserStore for BrokenUserStore {
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

    #[tokio::test]
    async fn test_register_then_login() {
        let f = fixture();
        let user = f.service.register("alice", "a@x.com", "secret1").await.unwrap();
        assert_eq!(
            user,
            UserResponse {
                id: 1,
                username: "alice".into(),
                email: "a@x.com".into()
            }
        );

        let outcome = f.service.login("alice", "secret1").await.unwrap();
        assert!(!outcome.token.is_empty());
        assert_eq!(outcome.user, user);

        let claims = validate_token(&outcome.token, &jwt()).unwrap();
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 86_400);

        assert!(outcome.session.stored);
        assert_eq!(f.sessions.get(&outcome.session.id).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_the_plaintext() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();

        let stored = f.users.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_trims_identifiers() {
        let f = fixture();
        let user = f.service.register("  alice ", " a@x.com ", "secret1").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");
        assert!(f.service.login(" alice", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_register_validation_failure_persists_nothing() {
        let f = fixture();
        let err = f.service.register("alice", "a@x.com", "").await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert!(f.users.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();

        let err = f.service.register("alice", "b@y.com", "x").await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg == "Username already exists");
        assert_eq!(f.users.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();

        let err = f.service.register("bob", "a@x.com", "secret2").await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg == "Email already exists");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();

        let wrong = f.service.login("alice", "wrong").await.unwrap_err();
        let unknown = f.service.login("ghost", "secret1").await.unwrap_err();

        assert_eq!(wrong.to_string(), unknown.to_string());
        assert_matches!(wrong, CoreError::Unauthorized(msg) if msg == "Invalid credentials");
        assert_matches!(unknown, CoreError::Unauthorized(msg) if msg == "Invalid credentials");
    }

    #[tokio::test]
    async fn test_failed_login_issues_no_session() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();

        let _ = f.service.login("alice", "wrong").await;
        assert!(f.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let f = fixture();
        assert_matches!(
            f.service.login("", "secret1").await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            f.service.login("alice", "").await,
            Err(CoreError::Validation(_))
        );
        // Validation failures are not authentication attempts.
        assert_eq!(f.metrics.auth_attempts(false), 0);
    }

    #[tokio::test]
    async fn test_attempt_counter_distinguishes_outcomes() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();

        f.service.login("alice", "secret1").await.unwrap();
        let _ = f.service.login("alice", "wrong").await;
        let _ = f.service.login("ghost", "secret1").await;

        assert_eq!(f.metrics.auth_attempts(true), 1);
        assert_eq!(f.metrics.auth_attempts(false), 2);
    }

    #[tokio::test]
    async fn test_session_cache_failure_does_not_fail_login() {
        let users = Arc::new(InMemoryUserStore::new());
        let metrics = Arc::new(Metrics::new().unwrap());
        let service = AuthService::new(
            users,
            SessionManager::new(Arc::new(DownSessionStore)),
            hasher(),
            jwt(),
            metrics.clone(),
        )
        .unwrap();
        service.register("alice", "a@x.com", "secret1").await.unwrap();

        let outcome = service.login("alice", "secret1").await.unwrap();
        assert!(!outcome.token.is_empty());
        assert!(!outcome.session.id.is_empty());
        assert!(!outcome.session.stored);
        assert_eq!(metrics.auth_attempts(true), 1);
    }

    #[tokio::test]
    async fn test_user_store_failure_is_internal() {
        let service = AuthService::new(
            Arc::new(BrokenUserStore),
            SessionManager::new(Arc::new(InMemorySessionStore::new())),
            hasher(),
            jwt(),
            Arc::new(Metrics::new().unwrap()),
        )
        .unwrap();

        assert_matches!(
            service.register("alice", "a@x.com", "secret1").await,
            Err(CoreError::Internal(_))
        );
        assert_matches!(
            service.login("alice", "secret1").await,
            Err(CoreError::Internal(_))
        );
        assert_matches!(service.list_users().await, Err(CoreError::Internal(_)));
    }

    #[tokio::test]
    async fn test_missing_secret_is_internal_and_issues_no_session() {
        let users = Arc::new(InMemoryUserStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let service = AuthService::new(
            users,
            SessionManager::new(sessions.clone()),
            hasher(),
            JwtConfig {
                secret: String::new(),
            },
            Arc::new(Metrics::new().unwrap()),
        )
        .unwrap();
        service.register("alice", "a@x.com", "secret1").await.unwrap();

        assert_matches!(
            service.login("alice", "secret1").await,
            Err(CoreError::Internal(msg)) if msg.contains("Failed to generate token")
        );
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_users_omits_hashes() {
        let f = fixture();
        f.service.register("alice", "a@x.com", "secret1").await.unwrap();
        f.service.register("bob", "b@x.com", "secret2").await.unwrap();

        let users = f.service.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
        assert_eq!(users[1].username, "bob");
    }
}
