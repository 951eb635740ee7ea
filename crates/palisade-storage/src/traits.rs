//! Storage trait for the durable audit store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{AuditQuery, AuditStats};
use palisade_core::{AuditDraft, AuditRecord};

/// The durable, append-only audit store.
///
/// Implementations must be thread-safe (`Send + Sync`). Records are immutable
/// once appended: the trait deliberately exposes no update or delete.
///
/// # Example
///
/// ```ignore
/// use palisade_storage::{AuditQuery, AuditStore};
///
/// async fn recent_failures(store: &dyn AuditStore) -> Result<usize, StorageError> {
///     let failed = store.list(&AuditQuery::new().failed_only()).await?;
///     Ok(failed.len())
/// }
/// ```
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends one record, assigning its id and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AppendFailed` (or `ConnectionError`) when the
    /// backend cannot persist the record. Callers in the request path absorb
    /// this — an audit failure must never fail the request being audited.
    async fn append(&self, draft: AuditDraft) -> Result<AuditRecord, StorageError>;

    /// Lists records matching the query, newest first, paged by the query's
    /// `offset`/`limit`.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues; an empty result is
    /// `Ok(vec![])`.
    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, StorageError>;

    /// Fetches a single record by id. Returns `None` when absent.
    async fn find_by_id(&self, id: i64) -> Result<Option<AuditRecord>, StorageError>;

    /// Aggregates statistics over the trailing `period_days`.
    async fn statistics(&self, period_days: u32) -> Result<AuditStats, StorageError>;
}

/// Shared handle to a dynamically-dispatched audit store.
pub type DynAuditStore = Arc<dyn AuditStore>;
