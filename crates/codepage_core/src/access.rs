//! Who may edit which entry.

use crate::directory::Entry;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Site role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control.
    Administrator,
    /// May edit any entry.
    Editor,
    /// May edit own entries.
    Author,
    /// Read-only.
    Subscriber,
}

impl Role {
    /// Returns the role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Editor => "editor",
            Role::Author => "author",
            Role::Subscriber => "subscriber",
        }
    }

    /// Stable one-byte code, used in signed session tokens.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Role::Administrator => 1,
            Role::Editor => 2,
            Role::Author => 3,
            Role::Subscriber => 4,
        }
    }

    /// Inverse of [`Role::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Role::Administrator),
            2 => Some(Role::Editor),
            3 => Some(Role::Author),
            4 => Some(Role::Subscriber),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "editor" => Ok(Role::Editor),
            "author" => Ok(Role::Author),
            "subscriber" => Ok(Role::Subscriber),
            other => Err(CoreError::InvalidInput(format!("unknown role: {other}"))),
        }
    }
}

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Numeric user id.
    pub user_id: u64,
    /// Site role.
    pub role: Role,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub const fn new(user_id: u64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Decides whether a principal may modify an entry.
pub trait AccessPolicy: Send + Sync {
    /// Returns true if `principal` may edit `entry`.
    fn can_edit(&self, principal: &Principal, entry: &Entry) -> bool;
}

/// Role-based policy: administrators and editors edit everything, authors
/// edit their own entries, subscribers edit nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn can_edit(&self, principal: &Principal, entry: &Entry) -> bool {
        match principal.role {
            Role::Administrator | Role::Editor => true,
            Role::Author => entry.author == principal.user_id,
            Role::Subscriber => false,
        }
    }
}
