//! The closed set of roles a session can carry.
//!
//! Role is decided once, at login, by checking the user's email against the
//! admin allowlist. It is embedded in the access-token claims and never
//! re-read mid-session.

use serde::{Deserialize, Serialize};

/// Capability level of an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage the catalog and resolve requests.
    Admin,
    /// May submit requests and read their own data.
    Client,
}

impl Role {
    /// The wire/storage name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }

    /// Parse a role name. Unknown names are rejected rather than defaulted,
    /// so a tampered or stale token cannot smuggle in a new role.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "client" => Some(Role::Client),
            _ => None,
        }
    }

    /// Role conferred by allowlist membership.
    pub fn from_allowlisted(is_admin: bool) -> Role {
        if is_admin {
            Role::Admin
        } else {
            Role::Client
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
