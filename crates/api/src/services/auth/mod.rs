//! Authentication service.
//!
//! Registration, login, and the password-change lifecycle. Passwords are
//! stored only as Argon2id hashes. Each user has one opaque bearer token,
//! issued lazily on first registration/login and never expired or
//! rotated. Sessions record a fingerprint of the password hash so that a
//! password change invalidates old sessions without touching the token.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use tradewind_core::UserId;

use crate::db::RepositoryError;
use crate::db::sessions::SessionRepository;
use crate::db::tokens::TokenRepository;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Number of random bytes behind a bearer token (40 hex chars).
const TOKEN_BYTES: usize = 20;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
    sessions: SessionRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
            sessions: SessionRepository::new(pool),
        }
    }

    /// Register a new user and issue their bearer token.
    ///
    /// The caller has already validated field formats; this hashes the
    /// password, creates the row, and transitions the user straight to
    /// authenticated by issuing a token and opening a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short,
    /// `AuthError::UsernameTaken` / `AuthError::EmailTaken` on uniqueness
    /// collisions, `AuthError::Repository` for other database failures.
    pub async fn register(
        &self,
        new: &NewUser,
        password: &str,
    ) -> Result<(User, String), AuthError> {
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(new, &password_hash)
            .await
            .map_err(|e| match e {
            RepositoryError::Conflict(field) if field == "username" => AuthError::UsernameTaken,
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Repository(other),
        })?;

        let token = self.issue_token(user.id).await?;
        self.sessions
            .create(user.id, &session_auth_hash(&password_hash))
            .await?;

        Ok((user, token))
    }

    /// Login with username and password.
    ///
    /// Idempotent with respect to the token: repeated logins return the
    /// identical token value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any credential failure,
    /// without revealing whether the username or the password was wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let row = self
            .users
            .get_by_username_with_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &row.password_hash)?;

        let token = self.issue_token(row.user.id).await?;
        self.sessions
            .create(row.user.id, &session_auth_hash(&row.password_hash))
            .await?;

        Ok((row.user, token))
    }

    /// Change a user's password.
    ///
    /// Requires proof of the current password; the new password and its
    /// confirmation must match exactly. On success, sessions established
    /// under the old password are purged. The bearer token survives.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongOldPassword` if the proof fails,
    /// `AuthError::PasswordMismatch` if new/confirm differ,
    /// `AuthError::WeakPassword` if the new password is too short.
    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let current_hash = self.users.get_hash_by_id(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        verify_password(old_password, &current_hash)
            .map_err(|_| AuthError::WrongOldPassword)?;

        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        validate_password(new_password)?;

        let new_hash = hash_password(new_password)?;
        self.users.set_password_hash(user_id, &new_hash).await?;

        let purged = self
            .sessions
            .purge_stale(user_id, &session_auth_hash(&new_hash))
            .await?;
        tracing::debug!(user_id = %user_id, purged, "invalidated stale sessions");

        Ok(())
    }

    /// Fetch-or-create the user's bearer token.
    async fn issue_token(&self, user_id: UserId) -> Result<String, AuthError> {
        let candidate = generate_token();
        let token = self.tokens.get_or_create(user_id, &candidate).await?;
        Ok(token)
    }
}

/// Generate a fresh opaque token: 20 random bytes as 40 hex characters.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    let mut token = String::with_capacity(TOKEN_BYTES * 2);
    for b in bytes {
        token.push_str(&format!("{b:02x}"));
    }
    token
}

/// Fingerprint of a password hash, stored with each session.
///
/// Sessions whose fingerprint no longer matches the current password
/// hash are considered stale.
fn session_auth_hash(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_forty_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 40);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_session_auth_hash_is_stable() {
        let hash = "argon2id$fake$hash";
        assert_eq!(session_auth_hash(hash), session_auth_hash(hash));
        assert_ne!(session_auth_hash(hash), session_auth_hash("other"));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }
}
