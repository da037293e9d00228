//! The [`SessionStore`] trait and its Redis implementation.

use std::time::Duration;

use async_trait::async_trait;
use authgate_core::types::DbId;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{self, AsyncCommands, IntoConnectionInfo, RedisError};
use bb8_redis::RedisConnectionManager;

use crate::session::session_key;

/// Errors surfaced by a session store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] RunError<RedisError>),
}

/// Expiring key-value store holding `session:<id> -> user_id`.
///
/// Expired entries must be indistinguishable from entries that never existed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write `session_id -> user_id`, expiring after `ttl`.
    async fn put(&self, session_id: &str, user_id: DbId, ttl: Duration) -> Result<(), CacheError>;

    /// Resolve a session id to its user, or `None` if absent or expired.
    async fn get(&self, session_id: &str) -> Result<Option<DbId>, CacheError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// [`SessionStore`] backed by a bb8 pool of Redis connections.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisSessionStore {
    /// Build the pool for a Redis address, either a URL such as
    /// `redis://redis-service:6379` or an already parsed `ConnectionInfo`.
    pub async fn connect<T: IntoConnectionInfo>(info: T) -> Result<Self, CacheError> {
        let manager = RedisConnectionManager::new(info)?;
        let pool = Pool::builder().build(manager).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, session_id: &str, user_id: DbId, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        // SET key value EX seconds
        conn.set_ex::<_, _, ()>(session_key(session_id), user_id, ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<DbId>, CacheError> {
        let mut conn = self.pool.get().await?;
        let user_id: Option<DbId> = conn.get(session_key(session_id)).await?;
        Ok(user_id)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(())
    }
}
