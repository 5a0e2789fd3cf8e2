//! Database operations for storefront `PostgreSQL`.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `users`, `user_passwords` - Site authentication
//! - `user_roles` - Checker/admin grants (no row means `user`)
//! - `games` - Navigation tabs and their seller verification method
//! - `accounts`, `account_skins` - The catalog
//! - `cart_items` - Per-user cart lines
//! - `orders`, `order_lines` - Completed checkouts
//! - `sell_requests` - Seller submissions awaiting review
//!
//! Sessions live in `tower_sessions.session`, managed by the session store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p gamehub-cli -- migrate
//! ```

pub mod accounts;
pub mod cart;
pub mod games;
pub mod orders;
pub mod sell_requests;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use cart::CartRepository;
pub use games::GameRepository;
pub use orders::OrderRepository;
pub use sell_requests::SellRequestRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map unique and foreign-key violations to [`RepositoryError::Conflict`].
fn conflict_or_database(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
    {
        return RepositoryError::Conflict(what.to_string());
    }
    RepositoryError::Database(e)
}

/// Convert a stored non-negative integer column.
fn to_u32(value: i32, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {column}: {value}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u32() {
        assert_eq!(to_u32(3, "quantity").ok(), Some(3));
        assert!(matches!(
            to_u32(-1, "quantity"),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = conflict_or_database(sqlx::Error::RowNotFound, "game");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
