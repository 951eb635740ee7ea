//! Semantic request classification.
//!
//! Maps an HTTP `(method, path)` pair onto the closed [`AuditAction`]
//! taxonomy through an ordered rule table. Evaluation walks [`RULES`] top to
//! bottom and the first matching rule wins, so declaration order carries the
//! precedence semantics: resource-specific sub-paths (`/trash/cleanup`,
//! `/download`, `/preview`, …) are declared before the generic verb dispatch
//! of their group, and resource groups are declared before the generic rules
//! that would otherwise shadow them (the standalone `/trash` rules come after
//! every per-resource trash rule).
//!
//! Classification is total: when no rule matches, the fallback is
//! [`AuditAction::ApiRequest`]. There is no error path.
//!
//! A group predicate not committing is deliberate: a request that enters a
//! resource group but matches none of its verb rules (e.g. `HEAD
//! /api/documents/3`) falls through to the remaining rules instead of being
//! swallowed by the group. The one exception is the auth group, which commits
//! a generic fallback for any unrecognized `/auth` path.
//!
//! # Example
//!
//! ```
//! use palisade_core::{AuditAction, classify};
//!
//! assert_eq!(
//!     classify("DELETE", "/api/documents/42/trash/cleanup"),
//!     AuditAction::TrashCleanup,
//! );
//! assert_eq!(classify("GET", "/made/up/path"), AuditAction::ApiRequest);
//! ```

use crate::action::AuditAction::{self, *};

/// Path predicate of a classification rule.
///
/// All comparisons are verbatim substring/prefix tests, matching the loose
/// route conventions the taxonomy grew up with (mount prefixes such as
/// `/api` are irrelevant to `Contains`).
#[derive(Debug, Clone, Copy)]
enum PathRule {
    /// Substring match anywhere in the path.
    Contains(&'static str),
    /// Substring match against the ASCII-lowercased path.
    ContainsIgnoreCase(&'static str),
    /// Prefix match.
    StartsWith(&'static str),
    /// Exact match against one of the listed literals.
    EqualsAny(&'static [&'static str]),
    /// Union: any nested predicate suffices.
    AnyOf(&'static [PathRule]),
}

impl PathRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Contains(needle) => path.contains(needle),
            Self::ContainsIgnoreCase(needle) => path.to_ascii_lowercase().contains(needle),
            Self::StartsWith(prefix) => path.starts_with(prefix),
            Self::EqualsAny(literals) => literals.contains(&path),
            Self::AnyOf(rules) => rules.iter().any(|rule| rule.matches(path)),
        }
    }
}

/// Method predicate of a classification rule.
///
/// Methods are compared verbatim; standard HTTP methods are uppercase on the
/// wire and no normalization is applied.
#[derive(Debug, Clone, Copy)]
enum MethodRule {
    Any,
    Get,
    Post,
    Delete,
    /// PUT or PATCH, the two update verbs.
    PutOrPatch,
}

impl MethodRule {
    fn matches(&self, method: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Get => method == "GET",
            Self::Post => method == "POST",
            Self::Delete => method == "DELETE",
            Self::PutOrPatch => method == "PUT" || method == "PATCH",
        }
    }
}

use MethodRule::{Any, Delete, Get, Post, PutOrPatch};
use PathRule::{AnyOf, Contains, ContainsIgnoreCase, EqualsAny, StartsWith};

/// One row of the classification table: every path predicate must hold, the
/// method predicate must hold, and then `action` is the verdict.
struct Rule {
    path: &'static [PathRule],
    method: MethodRule,
    action: AuditAction,
}

impl Rule {
    fn matches(&self, method: &str, path: &str) -> bool {
        self.method.matches(method) && self.path.iter().all(|rule| rule.matches(path))
    }
}

const fn rule(path: &'static [PathRule], method: MethodRule, action: AuditAction) -> Rule {
    Rule {
        path,
        method,
        action,
    }
}

/// `/auth/…` anywhere in the path, or any path beginning with `/auth`.
const AUTH: PathRule = AnyOf(&[Contains("/auth/"), StartsWith("/auth")]);
/// Calendar and event routes share one taxonomy group.
const CALENDAR: PathRule = AnyOf(&[Contains("/calendar"), Contains("/events")]);
/// Notification status transitions, in all three route spellings.
const NOTIFICATION_STATUS: PathRule = AnyOf(&[
    Contains("/status"),
    Contains("/respond-status"),
    Contains("/general-status"),
]);
/// Reminder dispatch triggers.
const REMINDER_TRIGGER: PathRule = AnyOf(&[Contains("/process"), Contains("/send_reminder")]);
/// Statistics, analytics and reporting routes.
const ANALYTICS: PathRule = AnyOf(&[
    Contains("/stats"),
    Contains("/analytics"),
    Contains("/report"),
]);
/// Server metadata routes.
const SERVER_INFO: PathRule = AnyOf(&[Contains("/info"), Contains("/server-time")]);

/// The ordered classification table. First match wins.
static RULES: &[Rule] = &[
    // Health probes, checked first
    rule(&[Contains("/health")], Any, HealthCheck),
    // Auth group; unrecognized auth paths commit to the generic fallback
    rule(&[AUTH, Contains("/login")], Any, Login),
    rule(&[AUTH, Contains("/logout")], Any, Logout),
    rule(&[AUTH, Contains("/create")], Any, Register),
    rule(&[AUTH, Contains("/check-email")], Any, EmailCheck),
    rule(&[AUTH], Any, ApiRequest),
    // Documents: specific sub-paths before verb dispatch
    rule(&[Contains("/documents"), Contains("/trash"), Contains("/cleanup")], Any, TrashCleanup),
    rule(&[Contains("/documents"), Contains("/trash")], Any, TrashView),
    rule(&[Contains("/documents"), Contains("/restore")], Any, DocumentRestore),
    rule(&[Contains("/documents"), Contains("/move")], Any, DocumentMove),
    rule(&[Contains("/documents"), Contains("/process")], Any, DocumentProcess),
    // Deleting a download target drops its cached rendition
    rule(&[Contains("/documents"), Contains("/download")], Delete, CacheClear),
    rule(&[Contains("/documents"), Contains("/download")], Any, DocumentDownload),
    rule(&[Contains("/documents"), Contains("/upload")], Post, DocumentUpload),
    rule(&[Contains("/documents")], Post, DocumentCreate),
    rule(&[Contains("/documents")], PutOrPatch, DocumentUpdate),
    rule(&[Contains("/documents")], Delete, DocumentDelete),
    rule(&[Contains("/documents")], Get, DocumentView),
    // Files: raw file listing reads count as document views
    rule(&[Contains("/files"), Contains("/upload")], Post, FileUpload),
    rule(&[Contains("/files"), Contains("/list")], Get, FileList),
    rule(&[Contains("/files")], Delete, FileDelete),
    rule(&[Contains("/files")], Get, DocumentView),
    // Folders, mirroring the document group
    rule(&[Contains("/folders"), Contains("/trash"), Contains("/cleanup")], Any, TrashCleanup),
    rule(&[Contains("/folders"), Contains("/trash")], Any, TrashView),
    rule(&[Contains("/folders"), Contains("/tree")], Any, FolderView),
    rule(&[Contains("/folders"), Contains("/restore")], Any, FolderRestore),
    rule(&[Contains("/folders"), Contains("/move")], Any, FolderMove),
    rule(&[Contains("/folders")], Post, FolderCreate),
    rule(&[Contains("/folders")], PutOrPatch, FolderUpdate),
    rule(&[Contains("/folders")], Delete, FolderDelete),
    rule(&[Contains("/folders")], Get, FolderView),
    // Folder contents outside the folder routes proper
    rule(&[Contains("/contents")], Any, FolderContentsView),
    // Calendar / events
    rule(&[CALENDAR, Contains("/check-overlap")], Any, EventCheckOverlap),
    rule(&[CALENDAR], Post, EventCreate),
    rule(&[CALENDAR], PutOrPatch, EventUpdate),
    rule(&[CALENDAR], Delete, EventDelete),
    rule(&[CALENDAR], Get, EventView),
    // Users
    rule(&[Contains("/users")], Post, UserCreate),
    rule(&[Contains("/users")], PutOrPatch, UserUpdate),
    rule(&[Contains("/users")], Delete, UserDelete),
    rule(&[Contains("/users")], Get, UserView),
    // Notifications: status transitions and stats before verb dispatch
    rule(&[Contains("/notifications"), NOTIFICATION_STATUS], Any, NotificationStatusUpdate),
    rule(&[Contains("/notifications"), Contains("/stats")], Any, StatsView),
    rule(&[Contains("/notifications")], Post, NotificationCreate),
    rule(&[Contains("/notifications")], PutOrPatch, NotificationUpdate),
    rule(&[Contains("/notifications")], Delete, NotificationDelete),
    rule(&[Contains("/notifications")], Get, NotificationRead),
    // Templates
    rule(&[Contains("/templates"), Contains("/preview")], Any, TemplatePreview),
    rule(&[Contains("/templates")], Post, TemplateCreate),
    rule(&[Contains("/templates")], PutOrPatch, TemplateUpdate),
    rule(&[Contains("/templates")], Delete, TemplateDelete),
    rule(&[Contains("/templates")], Get, TemplateView),
    // Messages: search and unread counters before verb dispatch
    rule(&[Contains("/messages"), Contains("/search")], Any, MessageSearch),
    rule(&[Contains("/messages"), Contains("/count")], Any, MessageRead),
    rule(&[Contains("/messages")], Post, MessageSend),
    rule(&[Contains("/messages")], PutOrPatch, MessageUpdate),
    rule(&[Contains("/messages")], Delete, MessageDelete),
    rule(&[Contains("/messages")], Get, MessageRead),
    // Settings writes only; reads fall through
    rule(&[Contains("/settings")], PutOrPatch, SettingsUpdate),
    // Reminders (singular prefix also covers /reminders)
    rule(&[Contains("/reminder"), REMINDER_TRIGGER], Any, ReminderProcess),
    rule(&[Contains("/reminder")], Post, ReminderCreate),
    rule(&[Contains("/reminder")], PutOrPatch, ReminderUpdate),
    rule(&[Contains("/reminder")], Delete, ReminderDelete),
    rule(&[Contains("/reminder")], Get, ReminderView),
    // Standalone trash routes, after every resource-specific trash rule
    rule(&[Contains("/trash"), ContainsIgnoreCase("/restore")], Any, TrashRestore),
    rule(&[Contains("/trash"), Contains("/cleanup")], Any, TrashCleanup),
    rule(&[Contains("/trash")], Delete, TrashPermanentDelete),
    rule(&[Contains("/trash")], Get, TrashView),
    // Statistics and reporting
    rule(&[ANALYTICS], Get, StatsView),
    rule(&[ANALYTICS], Post, ReportGenerate),
    // Audit log access (also matches /audit-logs)
    rule(&[Contains("/audit")], Any, AuditView),
    // Server metadata
    rule(&[SERVER_INFO], Any, InfoView),
    rule(&[Contains("/clear-cache")], Any, CacheClear),
    rule(&[Contains("/validate-file")], Any, FileValidate),
    // Root and version banners
    rule(&[EqualsAny(&["/", "/version"])], Any, SystemAccess),
];

/// Classifies a request into its audit action.
///
/// Pure and total: any `(method, path)` pair yields exactly one tag, with
/// [`AuditAction::ApiRequest`] when nothing more specific matches.
pub fn classify(method: &str, path: &str) -> AuditAction {
    RULES
        .iter()
        .find(|rule| rule.matches(method, path))
        .map_or(ApiRequest, |rule| rule.action)
}
