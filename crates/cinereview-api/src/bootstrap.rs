//! Creation of the first administrator account.

use cinereview_accounts::domain::commands::validate_email;
use cinereview_accounts::domain::user::{NewUser, Role, User};
use cinereview_accounts::ports::{PasswordHasher, UserRepository};
use cinereview_core::error::DomainError;
use tracing::info;

/// What [`ensure_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    /// An account with the email existed; it was promoted and its password
    /// reset.
    Promoted,
}

/// Makes `email` an administrator with `password`, creating the account
/// under `username` if it does not exist yet.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a malformed email or empty
/// password, `DomainError::UserAlreadyExists` if `username` belongs to
/// another account, and `DomainError::Infrastructure` if the store fails.
pub async fn ensure_admin(
    users: &dyn UserRepository,
    hasher: &dyn PasswordHasher,
    email: &str,
    username: &str,
    password: &str,
) -> Result<(User, AdminBootstrap), DomainError> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(DomainError::Validation("password must not be empty".into()));
    }
    let password_hash = hasher.hash(password)?;

    if let Some(existing) = users.get_by_email(email).await? {
        let id = existing.user.id;
        users.update_role(id, Role::Admin).await?;
        users.update_password(id, &password_hash).await?;
        info!(user_id = %id, "existing account promoted to admin");
        let user = users
            .get_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))?
            .user;
        return Ok((user, AdminBootstrap::Promoted));
    }

    let user = users
        .create(&NewUser {
            email: email.to_owned(),
            username: username.to_owned(),
            password_hash,
            role: Role::Admin,
        })
        .await?;
    info!(user_id = %user.id, "admin account created");
    Ok((user, AdminBootstrap::Created))
}
