//! User storage trait.
//!
//! Defines the interface for user persistence. Implementations are provided
//! by storage backends; the in-memory one lives in `palisade-db-memory`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, Role};
use crate::error::AuthResult;
use palisade_core::EventTime;

/// A user account as stored.
///
/// The password hash travels with the record for login verification; strip
/// it before exposing the user over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Unique account id.
    pub id: i64,

    /// Login email, stored lowercase.
    pub email: String,

    /// Display name.
    pub name: String,

    /// PHC-formatted Argon2 hash.
    pub password_hash: String,

    /// Assigned role.
    pub role: Role,

    /// Inactive accounts cannot authenticate.
    pub active: bool,

    /// When the account was created.
    pub created_at: EventTime,
}

impl AuthUser {
    /// The actor view of this account, without the credential material.
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Fields needed to create an account. The id and timestamp are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email; stores must normalize to lowercase.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Already-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
}

/// Storage operations for user accounts.
///
/// # Example
///
/// ```ignore
/// use palisade_auth::storage::UserStore;
///
/// async fn example(store: &dyn UserStore) {
///     if let Some(user) = store.find_by_email("alice@example.com").await? {
///         println!("found {}", user.name);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by their unique id.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, user_id: i64) -> AuthResult<Option<AuthUser>>;

    /// Find a user by email. Lookup is case-insensitive.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<AuthUser>>;

    /// Create a new account and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if a user with the same email already exists or the
    /// storage operation fails.
    async fn create(&self, user: NewUser) -> AuthResult<AuthUser>;
}

/// Shared handle to a user store.
pub type DynUserStore = Arc<dyn UserStore>;
