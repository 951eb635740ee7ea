use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed taxonomy of semantic audit actions.
///
/// Every request the pipeline observes is classified into exactly one of
/// these tags (see [`crate::classify`]); [`AuditAction::ApiRequest`] is the
/// catch-all for anything no rule recognizes. The set is closed: new tags
/// are added here, never invented at runtime.
///
/// Serialized as SCREAMING_SNAKE_CASE strings (`"DOCUMENT_UPLOAD"`), the
/// form stored on audit records and accepted by query filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    // Authentication
    Login,
    Logout,
    Register,
    PasswordChange,
    EmailCheck,

    // User management
    UserCreate,
    UserUpdate,
    UserDelete,
    UserView,

    // Document management
    DocumentCreate,
    DocumentUpdate,
    DocumentDelete,
    DocumentView,
    DocumentDownload,
    DocumentUpload,
    DocumentRestore,
    DocumentMove,
    DocumentProcess,

    // Folder management
    FolderCreate,
    FolderUpdate,
    FolderDelete,
    FolderView,
    FolderRestore,
    FolderMove,
    FolderContentsView,

    // Calendar events
    EventCreate,
    EventUpdate,
    EventDelete,
    EventView,
    EventCheckOverlap,

    // Notifications
    NotificationCreate,
    NotificationRead,
    NotificationUpdate,
    NotificationDelete,
    NotificationStatusUpdate,

    // Templates
    TemplateCreate,
    TemplateUpdate,
    TemplateDelete,
    TemplateView,
    TemplatePreview,
    TemplateUse,

    // Messages
    MessageSend,
    MessageRead,
    MessageUpdate,
    MessageDelete,
    MessageSearch,

    // Reminders
    ReminderCreate,
    ReminderUpdate,
    ReminderDelete,
    ReminderView,
    ReminderProcess,

    // Trash
    TrashView,
    TrashRestore,
    TrashPermanentDelete,
    TrashCleanup,

    // Files
    FileUpload,
    FileList,
    FileDelete,
    FileValidate,

    // Settings and data transfer
    SettingsUpdate,
    ExportData,
    ImportData,

    // Permissions
    PermissionGrant,
    PermissionRevoke,

    // Reporting
    StatsView,
    ReportGenerate,
    AuditView,

    // System
    SystemAccess,
    HealthCheck,
    InfoView,
    CacheClear,

    // Catch-all for anything unrecognized
    ApiRequest,
}

impl AuditAction {
    /// Stable string form, identical to the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Register => "REGISTER",
            Self::PasswordChange => "PASSWORD_CHANGE",
            Self::EmailCheck => "EMAIL_CHECK",
            Self::UserCreate => "USER_CREATE",
            Self::UserUpdate => "USER_UPDATE",
            Self::UserDelete => "USER_DELETE",
            Self::UserView => "USER_VIEW",
            Self::DocumentCreate => "DOCUMENT_CREATE",
            Self::DocumentUpdate => "DOCUMENT_UPDATE",
            Self::DocumentDelete => "DOCUMENT_DELETE",
            Self::DocumentView => "DOCUMENT_VIEW",
            Self::DocumentDownload => "DOCUMENT_DOWNLOAD",
            Self::DocumentUpload => "DOCUMENT_UPLOAD",
            Self::DocumentRestore => "DOCUMENT_RESTORE",
            Self::DocumentMove => "DOCUMENT_MOVE",
            Self::DocumentProcess => "DOCUMENT_PROCESS",
            Self::FolderCreate => "FOLDER_CREATE",
            Self::FolderUpdate => "FOLDER_UPDATE",
            Self::FolderDelete => "FOLDER_DELETE",
            Self::FolderView => "FOLDER_VIEW",
            Self::FolderRestore => "FOLDER_RESTORE",
            Self::FolderMove => "FOLDER_MOVE",
            Self::FolderContentsView => "FOLDER_CONTENTS_VIEW",
            Self::EventCreate => "EVENT_CREATE",
            Self::EventUpdate => "EVENT_UPDATE",
            Self::EventDelete => "EVENT_DELETE",
            Self::EventView => "EVENT_VIEW",
            Self::EventCheckOverlap => "EVENT_CHECK_OVERLAP",
            Self::NotificationCreate => "NOTIFICATION_CREATE",
            Self::NotificationRead => "NOTIFICATION_READ",
            Self::NotificationUpdate => "NOTIFICATION_UPDATE",
            Self::NotificationDelete => "NOTIFICATION_DELETE",
            Self::NotificationStatusUpdate => "NOTIFICATION_STATUS_UPDATE",
            Self::TemplateCreate => "TEMPLATE_CREATE",
            Self::TemplateUpdate => "TEMPLATE_UPDATE",
            Self::TemplateDelete => "TEMPLATE_DELETE",
            Self::TemplateView => "TEMPLATE_VIEW",
            Self::TemplatePreview => "TEMPLATE_PREVIEW",
            Self::TemplateUse => "TEMPLATE_USE",
            Self::MessageSend => "MESSAGE_SEND",
            Self::MessageRead => "MESSAGE_READ",
            Self::MessageUpdate => "MESSAGE_UPDATE",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::MessageSearch => "MESSAGE_SEARCH",
            Self::ReminderCreate => "REMINDER_CREATE",
            Self::ReminderUpdate => "REMINDER_UPDATE",
            Self::ReminderDelete => "REMINDER_DELETE",
            Self::ReminderView => "REMINDER_VIEW",
            Self::ReminderProcess => "REMINDER_PROCESS",
            Self::TrashView => "TRASH_VIEW",
            Self::TrashRestore => "TRASH_RESTORE",
            Self::TrashPermanentDelete => "TRASH_PERMANENT_DELETE",
            Self::TrashCleanup => "TRASH_CLEANUP",
            Self::FileUpload => "FILE_UPLOAD",
            Self::FileList => "FILE_LIST",
            Self::FileDelete => "FILE_DELETE",
            Self::FileValidate => "FILE_VALIDATE",
            Self::SettingsUpdate => "SETTINGS_UPDATE",
            Self::ExportData => "EXPORT_DATA",
            Self::ImportData => "IMPORT_DATA",
            Self::PermissionGrant => "PERMISSION_GRANT",
            Self::PermissionRevoke => "PERMISSION_REVOKE",
            Self::StatsView => "STATS_VIEW",
            Self::ReportGenerate => "REPORT_GENERATE",
            Self::AuditView => "AUDIT_VIEW",
            Self::SystemAccess => "SYSTEM_ACCESS",
            Self::HealthCheck => "HEALTH_CHECK",
            Self::InfoView => "INFO_VIEW",
            Self::CacheClear => "CACHE_CLEAR",
            Self::ApiRequest => "API_REQUEST",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Reuse the serde mapping so the two representations cannot drift.
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| CoreError::invalid_action(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for action in [
            AuditAction::Login,
            AuditAction::DocumentUpload,
            AuditAction::TrashCleanup,
            AuditAction::NotificationStatusUpdate,
            AuditAction::ApiRequest,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_from_str_round_trip() {
        let action: AuditAction = "EVENT_CHECK_OVERLAP".parse().unwrap();
        assert_eq!(action, AuditAction::EventCheckOverlap);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "NOT_A_TAG".parse::<AuditAction>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid audit action: NOT_A_TAG");
    }

    #[test]
    fn test_display_is_screaming_snake() {
        assert_eq!(AuditAction::FolderContentsView.to_string(), "FOLDER_CONTENTS_VIEW");
        assert_eq!(AuditAction::TrashPermanentDelete.to_string(), "TRASH_PERMANENT_DELETE");
    }
}
