//! Registration and login.

use std::sync::Arc;

use cinereview_core::error::DomainError;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::commands::{LoginUser, RegisterUser};
use crate::domain::user::{NewUser, Role, User};
use crate::ports::{PasswordHasher, UserRepository};
use crate::security::token::TokenIssuer;

/// A signed-in user and their bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The account.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Opens accounts and signs users in.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenIssuer,
}

impl AuthService {
    /// Creates a new `AuthService`.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    /// Creates a `user`-role account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for invalid input and
    /// `DomainError::UserAlreadyExists` if the email is taken.
    #[instrument(skip(self, command), fields(email = %command.email))]
    pub async fn register(&self, command: &RegisterUser) -> Result<AuthSession, DomainError> {
        command.validate()?;

        if self.users.get_by_email(&command.email).await?.is_some() {
            return Err(DomainError::UserAlreadyExists(command.email.clone()));
        }

        let password_hash = self.hasher.hash(&command.password)?;
        let user = self
            .users
            .create(&NewUser {
                email: command.email.clone(),
                username: command.username.clone(),
                password_hash,
                role: Role::User,
            })
            .await?;

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "user registered");
        Ok(AuthSession { user, token })
    }

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCredentials` for an unknown email or a
    /// wrong password.
    #[instrument(skip(self, command), fields(email = %command.email))]
    pub async fn login(&self, command: &LoginUser) -> Result<AuthSession, DomainError> {
        command.validate()?;

        let Some(stored) = self.users.get_by_email(&command.email).await? else {
            warn!("login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !self.hasher.verify(&stored.password_hash, &command.password)? {
            warn!(user_id = %stored.user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(&stored.user)?;
        info!(user_id = %stored.user.id, "user logged in");
        Ok(AuthSession {
            user: stored.user,
            token,
        })
    }
}
