//! Capabilities the Accounts context needs from the outside world.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use uuid::Uuid;

use crate::domain::stats::{AdminStats, UserStats};
use crate::domain::user::{NewUser, Role, StoredUser, User, UserFilters};

/// Persistence for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts an account. Returns `DomainError::UserAlreadyExists` if the
    /// email or username is taken.
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Point lookup by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, DomainError>;

    /// Lookup by login email.
    async fn get_by_email(&self, email: &str) -> Result<Option<StoredUser>, DomainError>;

    /// Lookup by username.
    async fn get_by_username(&self, username: &str)
    -> Result<Option<StoredUser>, DomainError>;

    /// One page of matching users, newest first, with the total match count.
    async fn list(
        &self,
        filters: &UserFilters,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), DomainError>;

    /// Changes the account's role.
    async fn update_role(&self, id: Uuid, role: Role) -> Result<(), DomainError>;

    /// Changes email and/or username; `None` keeps the stored value.
    async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), DomainError>;

    /// Replaces the password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError>;

    /// Removes the account together with its reviews.
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if hashing fails.
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Returns `true` if `password` matches `hash`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if `hash` is malformed.
    fn verify(&self, hash: &str, password: &str) -> Result<bool, DomainError>;
}

/// Read-only aggregate queries over users, movies, reviews and genres.
#[async_trait]
pub trait StatsReader: Send + Sync {
    /// Review statistics for one user.
    async fn user_stats(&self, user_id: Uuid) -> Result<UserStats, DomainError>;

    /// Site-wide totals; the recent counters include rows created at or
    /// after `since`.
    async fn admin_stats(&self, since: DateTime<Utc>) -> Result<AdminStats, DomainError>;
}
