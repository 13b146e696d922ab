//! Account management for users and administrators.

use std::sync::Arc;

use cinereview_core::error::DomainError;
use cinereview_core::pagination::{DEFAULT_LIMIT, PageRequest, Paginated};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::commands::{ChangePassword, UpdateUser};
use crate::domain::stats::UserStats;
use crate::domain::user::{Role, StoredUser, User, UserFilters};
use crate::ports::{PasswordHasher, StatsReader, UserRepository};

/// Reads and changes accounts.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    stats: Arc<dyn StatsReader>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        stats: Arc<dyn StatsReader>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            stats,
            hasher,
        }
    }

    /// One account.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UserNotFound` if it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<User, DomainError> {
        Ok(self.stored(id).await?.user)
    }

    /// One page of accounts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn list(
        &self,
        filters: &UserFilters,
        page: PageRequest,
    ) -> Result<Paginated<User>, DomainError> {
        let page = page.normalized(DEFAULT_LIMIT);
        let (users, total) = self.users.list(filters, page).await?;
        Ok(Paginated::new(users, total, page))
    }

    /// Changes an account's role. `role` must be `user` or `admin`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unknown role and
    /// `DomainError::UserNotFound` if the account does not exist.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn update_role(&self, id: Uuid, role: &str) -> Result<User, DomainError> {
        let role: Role = role.parse()?;
        self.stored(id).await?;
        self.users.update_role(id, role).await?;
        info!(%role, "user role changed");
        self.get(id).await
    }

    /// Changes email and/or username, keeping both unique.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for invalid input,
    /// `DomainError::UserNotFound` if the account does not exist and
    /// `DomainError::UserAlreadyExists` if another account has the email
    /// or username.
    #[instrument(skip(self, command), fields(user_id = %id))]
    pub async fn update(&self, id: Uuid, command: &UpdateUser) -> Result<(), DomainError> {
        command.validate()?;
        let current = self.stored(id).await?.user;

        let email = command.email_change().filter(|e| *e != current.email);
        if let Some(email) = email {
            let taken = self
                .users
                .get_by_email(email)
                .await?
                .is_some_and(|other| other.user.id != id);
            if taken {
                return Err(DomainError::UserAlreadyExists(email.to_owned()));
            }
        }

        let username = command
            .username_change()
            .filter(|u| *u != current.username);
        if let Some(username) = username {
            let taken = self
                .users
                .get_by_username(username)
                .await?
                .is_some_and(|other| other.user.id != id);
            if taken {
                return Err(DomainError::UserAlreadyExists(username.to_owned()));
            }
        }

        self.users.update(id, email, username).await?;
        info!("user updated");
        Ok(())
    }

    /// Updates one's own account and returns the fresh record.
    ///
    /// # Errors
    ///
    /// As [`UserService::update`].
    pub async fn update_profile(&self, id: Uuid, command: &UpdateUser) -> Result<User, DomainError> {
        self.update(id, command).await?;
        self.get(id).await
    }

    /// Changes one's own password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new password is too short,
    /// `DomainError::UserNotFound` if the account does not exist and
    /// `DomainError::InvalidCredentials` if the current password is wrong.
    #[instrument(skip(self, command), fields(user_id = %id))]
    pub async fn update_password(
        &self,
        id: Uuid,
        command: &ChangePassword,
    ) -> Result<(), DomainError> {
        command.validate()?;
        let stored = self.stored(id).await?;

        if !self
            .hasher
            .verify(&stored.password_hash, &command.current_password)?
        {
            return Err(DomainError::InvalidCredentials);
        }

        let hash = self.hasher.hash(&command.new_password)?;
        self.users.update_password(id, &hash).await?;
        info!("password changed");
        Ok(())
    }

    /// Deletes an account on behalf of an administrator, who may not delete
    /// themselves.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` for self-deletion and
    /// `DomainError::UserNotFound` if the account does not exist.
    #[instrument(skip(self), fields(user_id = %id, admin_id = %admin_id))]
    pub async fn delete(&self, id: Uuid, admin_id: Uuid) -> Result<(), DomainError> {
        if id == admin_id {
            return Err(DomainError::Forbidden("cannot delete yourself".into()));
        }
        self.stored(id).await?;
        self.users.delete(id).await?;
        info!("user deleted");
        Ok(())
    }

    /// Review statistics for a user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store fails.
    pub async fn stats(&self, id: Uuid) -> Result<UserStats, DomainError> {
        self.stats.user_stats(id).await
    }

    async fn stored(&self, id: Uuid) -> Result<StoredUser, DomainError> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }
}
