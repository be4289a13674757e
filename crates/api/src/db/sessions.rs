//! Login session repository.
//!
//! A session row records a fingerprint (`auth_hash`) of the password hash
//! it was established under. Changing the password purges every session
//! whose fingerprint no longer matches; the bearer token is untouched.

use sqlx::PgPool;

use tradewind_core::UserId;

use super::RepositoryError;

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a new session for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, user_id: UserId, auth_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO sessions (user_id, auth_hash) VALUES ($1, $2)")
            .bind(user_id)
            .bind(auth_hash)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete every session of the user whose fingerprint differs from
    /// `current_hash`. Returns the number of sessions invalidated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purge_stale(
        &self,
        user_id: UserId,
        current_hash: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND auth_hash <> $2")
            .bind(user_id)
            .bind(current_hash)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
