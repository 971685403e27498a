//! Principal entity: the authenticated identity and role behind a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role held by a principal, used for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular authenticated user
    User,
    /// Administrative user
    Admin,
}

impl Role {
    /// String form used in claims and database columns
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parses the string form back into a role
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered identity. Owned by the persistence layer; the role changes
/// only through an explicit administrative mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier
    pub id: Uuid,

    /// Login email address
    pub email: String,

    /// Role for authorization decisions
    pub role: Role,

    /// Bcrypt hash of the login credential, never the credential itself
    pub credential_hash: String,
}

impl Principal {
    /// Creates a new principal with a generated id
    pub fn new(email: String, role: Role, credential_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            role,
            credential_hash,
        }
    }

    /// Checks whether the principal holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
