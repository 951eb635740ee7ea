//! Structured audit log sink.
//!
//! Mirrors every durable audit record onto the tracing pipeline under the
//! `audit` target, and offers free-form convenience entries for events
//! outside the request path (lockout warnings, startup notices). Every
//! entry carries an `at` field stamped in the fixed regional audit offset
//! so operators read wall-clock time, matching the timestamps on stored
//! records.

use palisade_core::{AuditRecord, EventTime};
use std::fmt;

/// Tracing target shared by all sink entries, so audit output can be
/// filtered or routed independently of application logs.
pub const AUDIT_TARGET: &str = "audit";

/// Optional structured fields attached to a sink entry.
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    pub action: Option<String>,
    pub actor_email: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    pub client_ip: Option<String>,
    pub status_code: Option<u16>,
}

impl LogContext {
    /// Context carrying only an actor email.
    #[must_use]
    pub fn for_actor(email: impl Into<String>) -> Self {
        Self {
            actor_email: Some(email.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(email) = &self.actor_email {
            write!(f, " user:{email}")?;
        }
        if let Some(action) = &self.action {
            write!(f, " action:{action}")?;
        }
        if let Some(resource_type) = &self.resource_type {
            write!(f, " resource:{resource_type}")?;
            if let Some(id) = self.resource_id {
                write!(f, "/{id}")?;
            }
        }
        if let Some(ip) = &self.client_ip {
            write!(f, " ip:{ip}")?;
        }
        if let Some(status) = self.status_code {
            let marker = if status < 400 { "OK" } else { "FAIL" };
            write!(f, " [{marker}] {status}")?;
        }
        Ok(())
    }
}

pub fn info(message: &str, ctx: &LogContext) {
    tracing::info!(target: AUDIT_TARGET, at = %EventTime::now(), "{message}{ctx}");
}

pub fn warning(message: &str, ctx: &LogContext) {
    tracing::warn!(target: AUDIT_TARGET, at = %EventTime::now(), "{message}{ctx}");
}

pub fn error(message: &str, ctx: &LogContext) {
    tracing::error!(target: AUDIT_TARGET, at = %EventTime::now(), "{message}{ctx}");
}

pub fn success(message: &str, ctx: &LogContext) {
    tracing::info!(
        target: AUDIT_TARGET,
        at = %EventTime::now(),
        outcome = "success",
        "{message}{ctx}"
    );
}

pub fn failure(message: &str, ctx: &LogContext) {
    tracing::error!(
        target: AUDIT_TARGET,
        at = %EventTime::now(),
        outcome = "failure",
        "{message}{ctx}"
    );
}

/// Mirror a completed request's durable record.
///
/// Failed requests (status ≥ 400) are routed to the error channel so an
/// operator tailing only errors still sees every failed request.
pub fn request_completed(record: &AuditRecord, duration_ms: f64) {
    let ctx = LogContext {
        action: Some(record.action.to_string()),
        actor_email: record.user_email.clone(),
        client_ip: record.ip_address.clone(),
        status_code: record.status_code,
        ..LogContext::default()
    };
    let method = record.request_method.as_deref().unwrap_or("-");
    let path = record.request_path.as_deref().unwrap_or("-");
    let message = format!("{method} {path} ({duration_ms:.2}ms)");
    if record.is_failure() {
        failure(&message, &ctx);
    } else {
        success(&message, &ctx);
    }
}
