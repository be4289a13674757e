//! Database operations for the API `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `users` - Identity records and profile fields
//! - `auth_tokens` - One opaque bearer token per user
//! - `sessions` - Login sessions with a password-hash fingerprint
//! - `product_types` / `products` - Catalog
//! - `carts` / `cart_items` - Per-user shopping carts
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run at startup
//! via `sqlx::migrate!`.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod carts;
pub mod catalog;
pub mod sessions;
pub mod tokens;
pub mod users;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation; carries the conflicting field name.
    #[error("unique constraint violation on {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
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

/// Map a sqlx error to `RepositoryError::Conflict` when it is a unique
/// violation on a known field, passing everything else through.
fn map_unique_violation(e: sqlx::Error, fields: &[&str]) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or_default();
        for field in fields {
            if constraint.contains(field) {
                return RepositoryError::Conflict((*field).to_owned());
            }
        }
    }
    RepositoryError::Database(e)
}
