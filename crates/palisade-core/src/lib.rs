pub mod action;
pub mod classify;
pub mod error;
pub mod record;
pub mod time;

pub use action::AuditAction;
pub use classify::classify;
pub use error::{CoreError, Result};
pub use record::{AuditDraft, AuditRecord};
pub use time::{AUDIT_OFFSET, EventTime, now_local};
