//! Audit record types.
//!
//! An [`AuditRecord`] captures one completed request: who did what, against
//! which resource, from where, and with what outcome. Records are append-only:
//! the pipeline creates each one exactly once and nothing ever mutates or
//! deletes a stored record.
//!
//! [`AuditDraft`] is the pre-insert form, assembled with builder methods by
//! the pipeline (and by auth flows for login events). The durable store
//! assigns the id and creation timestamp when the draft is appended.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::AuditAction;
use crate::time::EventTime;

/// A stored audit record.
///
/// The actor columns are nullable because the request may be unauthenticated,
/// and the email is denormalized so records stay meaningful after the user
/// row is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub action: AuditAction,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub status_code: Option<u16>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: EventTime,
}

impl AuditRecord {
    /// Whether the recorded outcome is a failure (status ≥ 400).
    pub fn is_failure(&self) -> bool {
        matches!(self.status_code, Some(code) if code >= 400)
    }
}

/// A record before insertion: everything but the store-assigned id and
/// creation timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub action: Option<AuditAction>,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub request_method: Option<String>,
    pub request_path: Option<String>,
    pub status_code: Option<u16>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<Value>,
    pub error_message: Option<String>,
}

impl AuditDraft {
    /// Create a draft for the given action.
    pub fn new(action: AuditAction) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    /// Set the authenticated actor.
    pub fn actor(mut self, user_id: i64, email: impl Into<String>) -> Self {
        self.user_id = Some(user_id);
        self.user_email = Some(email.into());
        self
    }

    /// Set the actor email only, for when the identity is known but the id
    /// is not (e.g. a failed login attempt for an existing address).
    pub fn actor_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    /// Set the target resource.
    pub fn resource(mut self, resource_type: impl Into<String>, resource_id: Option<i64>) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = resource_id;
        self
    }

    /// Set the HTTP method and path.
    pub fn request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.request_method = Some(method.into());
        self.request_path = Some(path.into());
        self
    }

    /// Set the response status code.
    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Set the client address and user agent.
    pub fn client(mut self, ip_address: Option<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Attach the structured detail payload.
    pub fn detail(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach an error message (for failed outcomes).
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Finalize into a stored record, stamping the creation time.
    ///
    /// Only durable stores call this; the id is theirs to assign. A draft
    /// without an action finalizes as [`AuditAction::ApiRequest`] so a store
    /// can never be handed an unclassifiable row.
    pub fn into_record(self, id: i64) -> AuditRecord {
        AuditRecord {
            id,
            user_id: self.user_id,
            user_email: self.user_email,
            action: self.action.unwrap_or(AuditAction::ApiRequest),
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            request_method: self.request_method,
            request_path: self.request_path,
            status_code: self.status_code,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            details: self.details,
            error_message: self.error_message,
            created_at: EventTime::now(),
        }
    }
}
