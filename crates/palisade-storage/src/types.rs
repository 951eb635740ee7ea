//! Query and aggregate types for the durable audit store.

use palisade_core::{AuditAction, AuditRecord, EventTime};
use serde::{Deserialize, Serialize};

/// Filter for listing audit records.
///
/// All filters are conjunctive; an unset filter matches everything. Results
/// are ordered newest-first and paged with `offset`/`limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Only records for this actor id.
    pub user_id: Option<i64>,
    /// Only records with this action tag.
    pub action: Option<AuditAction>,
    /// Only records touching this resource type.
    pub resource_type: Option<String>,
    /// Only records touching this resource id.
    pub resource_id: Option<i64>,
    /// Only failed outcomes (status ≥ 400).
    pub failed_only: bool,
    /// Only records created at or after this instant.
    pub start: Option<EventTime>,
    /// Only records created at or before this instant.
    pub end: Option<EventTime>,
    /// Number of matching records to skip.
    pub offset: usize,
    /// Maximum number of records to return.
    pub limit: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            action: None,
            resource_type: None,
            resource_id: None,
            failed_only: false,
            start: None,
            end: None,
            offset: 0,
            limit: 100,
        }
    }
}

impl AuditQuery {
    /// Creates an unfiltered query with the default page size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one actor.
    #[must_use]
    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Restricts to one action tag.
    #[must_use]
    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Restricts to one resource, optionally a specific id.
    #[must_use]
    pub fn for_resource(mut self, resource_type: impl Into<String>, id: Option<i64>) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = id;
        self
    }

    /// Restricts to failed outcomes only.
    #[must_use]
    pub fn failed_only(mut self) -> Self {
        self.failed_only = true;
        self
    }

    /// Restricts to a creation-time range (either bound optional).
    #[must_use]
    pub fn between(mut self, start: Option<EventTime>, end: Option<EventTime>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Sets the page window.
    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Whether a record passes every set filter.
    ///
    /// Backends with their own query engine are free to translate the filters
    /// instead; this predicate is the reference semantics.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(user_id) = self.user_id
            && record.user_id != Some(user_id)
        {
            return false;
        }
        if let Some(action) = self.action
            && record.action != action
        {
            return false;
        }
        if let Some(ref resource_type) = self.resource_type
            && record.resource_type.as_deref() != Some(resource_type.as_str())
        {
            return false;
        }
        if let Some(resource_id) = self.resource_id
            && record.resource_id != Some(resource_id)
        {
            return false;
        }
        if self.failed_only && !record.is_failure() {
            return false;
        }
        if let Some(start) = self.start
            && record.created_at < start
        {
            return false;
        }
        if let Some(end) = self.end
            && record.created_at > end
        {
            return false;
        }
        true
    }
}

/// Aggregate statistics over a trailing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    /// Length of the trailing period, in days.
    pub period_days: u32,
    /// Total records in the period.
    pub total_actions: u64,
    /// Records with a failed outcome (status ≥ 400).
    pub failed_actions: u64,
    /// Success percentage, rounded to two decimals; 0 when empty.
    pub success_rate: f64,
    /// Distinct authenticated actors in the period.
    pub unique_users: u64,
}

impl AuditStats {
    /// Computes the stats line from raw counters.
    #[must_use]
    pub fn compute(period_days: u32, total: u64, failed: u64, unique_users: u64) -> Self {
        let success_rate = if total > 0 {
            let rate = (total - failed) as f64 / total as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            period_days,
            total_actions: total,
            failed_actions: failed,
            success_rate,
            unique_users,
        }
    }
}
