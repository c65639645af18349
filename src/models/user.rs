//! User Model
//!
//! Core user data structures and type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User role. The set is closed: role assignment rejects anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// User representation for external API responses
///
/// This struct represents a user profile without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// User's display name
    pub name: String,

    /// User's email address (unique among active users, normalized)
    pub email: String,

    /// User's role
    pub role: Role,

    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the profile was last modified
    pub updated_at: DateTime<Utc>,
}

/// Internal user representation including the password hash and the
/// soft-delete flag. Never serialized into API responses.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    /// Strips the password hash and internal flags for external exposure.
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            name: record.name,
            email: record.email,
            role: record.role,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Query parameters for the paginated directory listing.
///
/// `name` and `email` are case-insensitive substring filters. Defaults:
/// limit 10, page 1; non-positive values fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl UserFilter {
    /// Effective page size after applying defaults
    pub fn effective_limit(&self) -> i64 {
        if self.limit <= 0 {
            10
        } else {
            self.limit
        }
    }

    /// Effective page number after applying defaults
    pub fn effective_page(&self) -> i64 {
        if self.page <= 0 {
            1
        } else {
            self.page
        }
    }

    /// Number of rows to skip: (page - 1) * limit
    pub fn skip(&self) -> i64 {
        (self.effective_page() - 1) * self.effective_limit()
    }
}
