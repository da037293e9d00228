//! Session ids, the cache key scheme, and best-effort session creation.

use std::sync::Arc;
use std::time::Duration;

use authgate_core::types::{DbId, Timestamp};
use chrono::Utc;
use rand::RngCore;

use crate::store::SessionStore;

/// Sessions live exactly as long as the tokens issued alongside them.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Random bytes per session id (hex-encoded to twice as many characters).
pub const SESSION_ID_BYTES: usize = 32;

const KEY_PREFIX: &str = "session:";

/// Cache key for a session id. Consumers resolving sessions directly against
/// Redis must use the same scheme.
pub fn session_key(session_id: &str) -> String {
    format!("{KEY_PREFIX}{session_id}")
}

/// Draw a fresh session id from the thread-local CSPRNG.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// A session handed back to the caller after login.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    /// Whether the cache accepted the write. A session that was not stored
    /// is still returned; the signed token remains the proof of login.
    pub stored: bool,
}

/// Creates sessions in a [`SessionStore`].
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            ttl: SESSION_TTL,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Create a session for `user_id`.
    ///
    /// Never fails: a cache write error is logged and the session is
    /// returned with `stored == false`.
    pub async fn create_session(&self, user_id: DbId) -> Session {
        let id = generate_session_id();
        let expires_at = Utc::now() + chrono::Duration::seconds(self.ttl.as_secs() as i64);

        let stored = match self.store.put(&id, user_id, self.ttl).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to store session");
                false
            }
        };

        Session {
            id,
            user_id,
            expires_at,
            stored,
        }
    }
}
