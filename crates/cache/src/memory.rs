//! In-memory [`SessionStore`] with lazy expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use authgate_core::types::DbId;
use tokio::sync::RwLock;

use crate::store::{CacheError, SessionStore};

#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, (DbId, Instant)>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries written, including ones that have expired but have
    /// not been looked up since.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session_id: &str, user_id: DbId, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<DbId>, CacheError> {
        let mut entries = self.entries.write().await;
        match entries.get(session_id) {
            Some((user_id, expires_at)) if Instant::now() < *expires_at => Ok(Some(*user_id)),
            Some(_) => {
                entries.remove(session_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
