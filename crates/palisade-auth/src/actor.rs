//! The authenticated actor attached to requests.
//!
//! The authentication gate resolves credentials to an [`Actor`] and inserts
//! it into the request extensions; handlers and the audit layer read it from
//! there rather than re-parsing tokens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including audit and lockout administration.
    Admin,
    /// Can manage shared resources for their team.
    Manager,
    /// Regular account.
    Member,
}

impl Role {
    /// Every assignable role, in privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Member];

    /// Lowercase wire form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }

    /// Human-readable name for role pickers.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Manager => "Manager",
            Self::Member => "Member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated user, as seen by handlers downstream of the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique account id.
    pub id: i64,

    /// Account email.
    pub email: String,

    /// Display name.
    pub name: String,

    /// Assigned role.
    pub role: Role,
}

impl Actor {
    /// Returns `true` if this actor holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if this actor holds any of the given roles.
    #[must_use]
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.has_role(*role))
    }

    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
