//! In-memory audit store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use palisade_core::{AuditDraft, AuditRecord, EventTime};
use palisade_storage::{AuditQuery, AuditStats, AuditStore, StorageError};

/// Append-only audit store backed by a `Vec` under an async `RwLock`.
///
/// Records are kept in append order; reads walk the vector in reverse to
/// produce the newest-first ordering the trait promises. Good for tests and
/// single-node deployments; everything is lost on restart.
pub struct MemoryAuditStore {
    records: RwLock<Vec<AuditRecord>>,
    next_id: AtomicI64,
}

impl MemoryAuditStore {
    /// Creates an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, draft: AuditDraft) -> Result<AuditRecord, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = draft.into_record(id);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|record| query.matches(record))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AuditRecord>, StorageError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn statistics(&self, period_days: u32) -> Result<AuditStats, StorageError> {
        let cutoff = EventTime::new(
            OffsetDateTime::now_utc() - time::Duration::days(i64::from(period_days)),
        );
        let records = self.records.read().await;

        let mut total = 0u64;
        let mut failed = 0u64;
        let mut users = HashSet::new();
        for record in records.iter().filter(|r| r.created_at >= cutoff) {
            total += 1;
            if record.is_failure() {
                failed += 1;
            }
            if let Some(user_id) = record.user_id {
                users.insert(user_id);
            }
        }

        Ok(AuditStats::compute(
            period_days,
            total,
            failed,
            users.len() as u64,
        ))
    }
}
