//! Bearer token repository.
//!
//! Each user has at most one opaque token. The unique constraint on
//! `auth_tokens.user_id` makes fetch-or-create atomic: two concurrent
//! logins race on the insert and both read back the surviving row.

use sqlx::PgPool;

use tradewind_core::UserId;

use super::RepositoryError;
use crate::models::user::AuthUser;

/// Repository for bearer token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the user's token, creating one from `candidate` if none exists.
    ///
    /// Idempotent: repeated calls return the same token value. Tokens
    /// never expire and are not rotated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(
        &self,
        user_id: UserId,
        candidate: &str,
    ) -> Result<String, RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_tokens (user_id, token) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(candidate)
        .execute(self.pool)
        .await?;

        let (token,): (String,) =
            sqlx::query_as("SELECT token FROM auth_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        Ok(token)
    }

    /// Resolve a bearer token to its user.
    ///
    /// Returns `None` for unknown tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_user(&self, token: &str) -> Result<Option<AuthUser>, RepositoryError> {
        let user = sqlx::query_as::<_, AuthUser>(
            "SELECT u.id, u.username, u.is_staff \
             FROM auth_tokens t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
