//! Store user management commands.
//!
//! ```bash
//! kedai-cli user create -u budi -e budi@example.com -r admin
//! kedai-cli user role -u budi -r customer
//! ```

use kedai_core::UserRole;
use kedai_storefront::db::UserRepository;
use kedai_storefront::models::{NewUser, UserChanges};

use super::{CliError, connect};

/// Create a new user.
///
/// # Errors
///
/// Returns an error if the input is invalid or the username or email is
/// already taken.
pub async fn create(username: &str, email: &str, role: UserRole) -> Result<(), CliError> {
    let new_user = NewUser::new(username, email, role)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool).create(&new_user).await?;
    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(())
}

/// Change the role of the user named `username`.
///
/// # Errors
///
/// Returns `CliError::UserNotFound` if no such user exists.
pub async fn set_role(username: &str, role: UserRole) -> Result<(), CliError> {
    let pool = connect().await?;
    let repo = UserRepository::new(&pool);

    let user = repo
        .get_by_username(username.trim())
        .await?
        .ok_or_else(|| CliError::UserNotFound(username.to_owned()))?;

    let changes = UserChanges::new(None, None, Some(role))?;
    let user = repo.update(user.id, &changes).await?;

    tracing::info!("{} is now {}", user.username, user.role);
    Ok(())
}
