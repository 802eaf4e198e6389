//! Role and capability model.
//!
//! Three permission tiers exist: readers can only consult records, editors
//! can mutate records / purchases / attachments, and admins additionally
//! manage user accounts. Capabilities are derived once from the role and
//! never recomputed ad hoc.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role name as stored in the `users.role` column and JWT claims.
pub const ROLE_READER: &str = "reader";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_ADMIN: &str = "admin";

/// The three permission tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Reader => ROLE_READER,
            Role::Editor => ROLE_EDITOR,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Whether this role may create, update, or delete records and their
    /// attachments / purchase entries.
    pub fn can_write(self) -> bool {
        matches!(self, Role::Editor | Role::Admin)
    }

    /// Whether this role may manage user accounts.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Reader
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_READER => Ok(Role::Reader),
            ROLE_EDITOR => Ok(Role::Editor),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}
