//! User accounts and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cinereview_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access level of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member: may write and manage their own reviews.
    #[default]
    User,
    /// Administrator: manages the catalog and users, may delete any review.
    Admin,
}

impl Role {
    /// The stored and wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(DomainError::Validation(format!("invalid role: {other}"))),
        }
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identifier assigned by the store.
    pub id: Uuid,
    /// Login email; unique.
    pub email: String,
    /// Display name; unique.
    pub username: String,
    /// Access level.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns `true` for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// An account as stored, including its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    /// The public account.
    pub user: User,
    /// PHC-format password hash.
    pub password_hash: String,
}

/// An account about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Display name.
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
    /// Access level.
    pub role: Role,
}

/// Optional constraints on user listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    /// Exact role.
    pub role: Option<Role>,
    /// Case-insensitive substring of email or username.
    pub search: Option<String>,
}

impl UserFilters {
    /// Returns `true` if `user` satisfies every filter that is set.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let search = self.search.as_deref().map(str::to_lowercase);
        self.role.is_none_or(|role| user.role == role)
            && search.is_none_or(|needle| {
                user.email.to_lowercase().contains(&needle)
                    || user.username.to_lowercase().contains(&needle)
            })
    }
}
