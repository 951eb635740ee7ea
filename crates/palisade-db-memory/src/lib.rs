//! In-memory storage backends for Palisade.
//!
//! This crate implements the `AuditStore` trait from `palisade-storage` and
//! the `UserStore` trait from `palisade-auth` over plain in-process maps.
//! It is the default backend for tests and single-node deployments.
//!
//! # Example
//!
//! ```ignore
//! use palisade_db_memory::{create_audit_store, create_user_store};
//!
//! let audit = create_audit_store();
//! let users = create_user_store();
//!
//! let record = audit.append(draft).await?;
//! ```

pub mod audit;
pub mod users;

pub use audit::MemoryAuditStore;
pub use users::MemoryUserStore;

use palisade_auth::storage::DynUserStore;
use palisade_storage::DynAuditStore;
use std::sync::Arc;

/// Creates a shareable in-memory audit store.
#[must_use]
pub fn create_audit_store() -> DynAuditStore {
    Arc::new(MemoryAuditStore::new())
}

/// Creates a shareable in-memory user store.
#[must_use]
pub fn create_user_store() -> DynUserStore {
    Arc::new(MemoryUserStore::new())
}
