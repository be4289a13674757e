//! User repository for database operations.
//!
//! Queries are runtime-checked (`query_as` + `FromRow`) so the workspace
//! builds without a live database.

use sqlx::{FromRow, PgPool};

use tradewind_core::UserId;

use super::{RepositoryError, map_unique_violation};
use crate::models::user::{NewUser, User, UserChanges};

/// Columns selected for every [`User`] result.
const USER_COLUMNS: &str = "id, username, email, first_name, last_name, phone_number, \
                            delivery_address, is_staff, created_at, updated_at";

/// A user row joined with its password hash, for credential checks.
#[derive(Debug, FromRow)]
pub struct UserWithHash {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("username")` or
    /// `RepositoryError::Conflict("email")` if the corresponding unique
    /// constraint is violated, `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        new: &NewUser,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users \
             (username, email, password_hash, first_name, last_name, phone_number, delivery_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(password_hash)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.phone_number)
            .bind(&new.delivery_address)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &["username", "email"]))
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Get a user and their password hash by username, for login.
    ///
    /// The username is taken as a raw string: an unknown or malformed
    /// username is simply no match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<UserWithHash>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
        );

        let row = sqlx::query_as::<_, UserWithHash>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Get a user's password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn get_hash_by_id(&self, id: UserId) -> Result<String, RepositoryError> {
        let hash: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        hash.map(|(h,)| h).ok_or(RepositoryError::NotFound)
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC");

        let users = sqlx::query_as::<_, User>(&sql).fetch_all(self.pool).await?;

        Ok(users)
    }

    /// Apply a partial profile update; `None` fields keep their value.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a username/email collision,
    /// `RepositoryError::Database` otherwise.
    pub async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "UPDATE users SET \
             username = COALESCE($2, username), \
             email = COALESCE($3, email), \
             first_name = COALESCE($4, first_name), \
             last_name = COALESCE($5, last_name), \
             phone_number = COALESCE($6, phone_number), \
             delivery_address = COALESCE($7, delivery_address), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.phone_number)
            .bind(&changes.delivery_address)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &["username", "email"]))
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
