//! In-memory [`UserStore`] used by tests and local experiments.
//!
//! Enforces the same uniqueness rules as the `users` table and reports
//! violations with the same constraint names.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::user::{CreateUser, User};
use crate::store::{StoreError, UserStore};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        let constraint = if users.iter().any(|u| u.username == input.username) {
            Some("uq_users_username")
        } else if users.iter().any(|u| u.email == input.email) {
            Some("uq_users_email")
        } else {
            None
        };
        if let Some(constraint) = constraint {
            return Err(StoreError::Conflict {
                constraint: constraint.to_string(),
            });
        }

        let user = User {
            id: users.len() as i64 + 1,
            username: input.username.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
