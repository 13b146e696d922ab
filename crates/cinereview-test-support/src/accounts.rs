//! Account doubles: user repository, stats reader and password hasher.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinereview_accounts::domain::stats::{AdminStats, UserStats};
use cinereview_accounts::domain::user::{NewUser, Role, StoredUser, User, UserFilters};
use cinereview_accounts::ports::{PasswordHasher, StatsReader, UserRepository};
use cinereview_core::error::DomainError;
use cinereview_core::pagination::PageRequest;
use uuid::Uuid;

/// Accounts held in memory with unique email and username checks.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<StoredUser>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an account directly, bypassing uniqueness checks. The
    /// password hash is `password` itself, which pairs with
    /// [`PlainTextPasswordHasher`].
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, email: &str, username: &str, password: &str, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            username: username.to_owned(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(StoredUser {
            user: user.clone(),
            password_hash: password.to_owned(),
        });
        user
    }

    /// The stored password hash of an account.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn password_hash(&self, id: Uuid) -> Option<String> {
        self.find(|u| u.user.id == id).map(|u| u.password_hash)
    }

    fn find(&self, pred: impl Fn(&StoredUser) -> bool) -> Option<StoredUser> {
        self.users.lock().unwrap().iter().find(|u| pred(u)).cloned()
    }

    fn with_user(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut StoredUser),
    ) -> Result<(), DomainError> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.user.id == id)
            .ok_or(DomainError::UserNotFound(id))?;
        change(stored);
        stored.user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.user.email == user.email || u.user.username == user.username)
        {
            return Err(DomainError::UserAlreadyExists(user.email.clone()));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash.clone(),
        });
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, DomainError> {
        Ok(self.find(|u| u.user.id == id))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<StoredUser>, DomainError> {
        Ok(self.find(|u| u.user.email == email))
    }

    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, DomainError> {
        Ok(self.find(|u| u.user.username == username))
    }

    async fn list(
        &self,
        filters: &UserFilters,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), DomainError> {
        let mut matching: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.user.clone())
            .filter(|u| filters.matches(u))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(0);
        Ok((matching.into_iter().skip(skip).take(take).collect(), total))
    }

    async fn update_role(&self, id: Uuid, role: Role) -> Result<(), DomainError> {
        self.with_user(id, |u| u.user.role = role)
    }

    async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), DomainError> {
        self.with_user(id, |u| {
            if let Some(email) = email {
                email.clone_into(&mut u.user.email);
            }
            if let Some(username) = username {
                username.clone_into(&mut u.user.username);
            }
        })
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DomainError> {
        self.with_user(id, |u| password_hash.clone_into(&mut u.password_hash))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.users.lock().unwrap().retain(|u| u.user.id != id);
        Ok(())
    }
}

/// A stats reader returning canned values and recording the `since`
/// instant it was queried with.
#[derive(Debug, Default)]
pub struct StaticStatsReader {
    user_stats: UserStats,
    admin_stats: AdminStats,
    admin_since: Mutex<Vec<DateTime<Utc>>>,
}

impl StaticStatsReader {
    /// Creates a reader returning the given values.
    #[must_use]
    pub fn new(user_stats: UserStats, admin_stats: AdminStats) -> Self {
        Self {
            user_stats,
            admin_stats,
            admin_since: Mutex::new(Vec::new()),
        }
    }

    /// The `since` arguments of every `admin_stats` call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn admin_since_calls(&self) -> Vec<DateTime<Utc>> {
        self.admin_since.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsReader for StaticStatsReader {
    async fn user_stats(&self, _user_id: Uuid) -> Result<UserStats, DomainError> {
        Ok(self.user_stats.clone())
    }

    async fn admin_stats(&self, since: DateTime<Utc>) -> Result<AdminStats, DomainError> {
        self.admin_since.lock().unwrap().push(since);
        Ok(self.admin_stats.clone())
    }
}

/// A "hasher" that stores passwords verbatim so tests stay fast and
/// readable. Never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextPasswordHasher;

impl PasswordHasher for PlainTextPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        Ok(password.to_owned())
    }

    fn verify(&self, hash: &str, password: &str) -> Result<bool, DomainError> {
        Ok(hash == password)
    }
}
