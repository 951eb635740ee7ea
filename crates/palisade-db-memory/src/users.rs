//! In-memory user store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use palisade_auth::error::{AuthError, AuthResult};
use palisade_auth::storage::{AuthUser, NewUser, UserStore};
use palisade_core::EventTime;

/// User accounts in a `HashMap` keyed by id.
///
/// Emails are normalized to lowercase on insert, so lookups are
/// case-insensitive by construction.
pub struct MemoryUserStore {
    users: RwLock<HashMap<i64, AuthUser>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    /// Creates an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of accounts held.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store holds no accounts.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, user_id: i64) -> AuthResult<Option<AuthUser>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<AuthUser>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> AuthResult<AuthUser> {
        let email = user.email.trim().to_lowercase();
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.email == email) {
            return Err(AuthError::invalid_request("Email already registered"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = AuthUser {
            id,
            email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            active: true,
            created_at: EventTime::now(),
        };
        users.insert(id, created.clone());
        Ok(created)
    }
}
