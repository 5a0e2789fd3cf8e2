//! Role grant commands.
//!
//! The first admin has to be granted from here; after that admins manage
//! roles from `/admin`.

use gamehub_core::{Email, Role};
use gamehub_storefront::db::UserRepository;

use super::{CommandError, connect};

/// Grant `role` to the user registered as `email`.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the user does not exist,
/// or the database fails.
pub async fn set(email: &str, role: &str) -> Result<(), CommandError> {
    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidArgument("email", e.to_string()))?;
    let role: Role = role
        .parse()
        .map_err(|e: String| CommandError::InvalidArgument("role", e))?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    users.set_role(user.id, role).await?;

    tracing::info!(email = %email, role = role.as_str(), "Role updated");
    Ok(())
}

/// Log every user with their role.
///
/// # Errors
///
/// Returns an error if the database fails.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool).list_with_roles().await?;

    for entry in &users {
        tracing::info!(
            email = %entry.user.email,
            role = entry.role.as_str(),
            "user"
        );
    }
    tracing::info!(count = users.len(), "Listed users");
    Ok(())
}
