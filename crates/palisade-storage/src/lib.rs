//! # palisade-storage
//!
//! Durable audit store abstraction for Palisade.
//!
//! This crate defines the trait and types the audit pipeline persists
//! through. It contains no implementation; backends live in separate crates
//! (`palisade-db-memory` ships the in-process one).
//!
//! The main trait is [`AuditStore`]: append-only writes plus the filtered
//! read and aggregate paths used by the admin surface.
//!
//! ```ignore
//! use palisade_storage::{AuditQuery, DynAuditStore};
//!
//! async fn user_activity(store: &DynAuditStore, user_id: i64) -> anyhow::Result<()> {
//!     let records = store.list(&AuditQuery::new().for_user(user_id)).await?;
//!     for record in records {
//!         println!("{} {}", record.created_at, record.action);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use traits::{AuditStore, DynAuditStore};
pub use types::{AuditQuery, AuditStats};
