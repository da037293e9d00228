//! The [`UserStore`] trait and its PostgreSQL implementation.

use async_trait::async_trait;

use crate::models::user::{CreateUser, User};
use crate::repositories::UserRepo;
use crate::DbPool;

/// PostgreSQL error code for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors surfaced by a credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert hit a unique constraint (`uq_users_username` or
    /// `uq_users_email`). Nothing was written.
    #[error("Duplicate value violates unique constraint: {constraint}")]
    Conflict { constraint: String },

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::Conflict { constraint };
            }
        }
        StoreError::Database(err)
    }
}

/// Durable table of users keyed by unique username and email.
///
/// Implementations must make `create` atomic: either the full row is
/// written or, on a uniqueness violation, nothing is.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return the stored row with its generated id.
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;

    /// Look up a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// [`UserStore`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_username(&self.pool, username).await?)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(UserRepo::list(&self.pool).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
