//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username/password combination is wrong. Deliberately does not say
    /// which half failed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The username is already registered.
    #[error("username already taken")]
    UsernameTaken,

    /// The email is already registered.
    #[error("email already taken")]
    EmailTaken,

    /// The password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The old password supplied to change-password was wrong.
    #[error("old password incorrect")]
    WrongOldPassword,

    /// New password and its confirmation differ.
    #[error("password confirmation does not match")]
    PasswordMismatch,

    /// The user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
