//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! The taxonomy maps one-to-one onto response codes:
//!
//! - validation failure -> 400 with field-level messages
//! - authentication failure -> 401, uniform message
//! - authorization failure -> 403
//! - id outside the caller's visible set -> 404

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Field-level validation messages, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`, the shape clients of the
/// original API expect for 400 responses.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set with a single field error.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Add a message for a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    /// True if no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into an `AppError` if any field failed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` carrying `self` when non-empty.
    pub fn into_result(self) -> std::result::Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// One or more fields failed validation.
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// No (or invalid) credentials on a request that requires them.
    #[error("Authentication required")]
    Unauthenticated,

    /// Valid session, insufficient rights.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found, or outside the caller's visible set.
    #[error("Not found")]
    NotFound,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Auth(AuthError::Repository(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::Auth(err) => auth_error_response(&err),
            Self::Unauthenticated => detail_response(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            Self::Forbidden(message) => detail_response(StatusCode::FORBIDDEN, &message),
            Self::NotFound => detail_response(StatusCode::NOT_FOUND, "Not found."),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => {
                detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Map an [`AuthError`] to its response.
///
/// Credential failures collapse into one uniform 401; the rest become
/// field-level 400s keyed the way the change-password/register forms
/// name their fields.
fn auth_error_response(err: &AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials | AuthError::UserNotFound => {
            detail_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        AuthError::UsernameTaken => field_response(
            "username",
            "A user with that username already exists.",
        ),
        AuthError::EmailTaken => {
            field_response("email", "A user with that email already exists.")
        }
        AuthError::WeakPassword(message) => field_response("new_password", message),
        AuthError::WrongOldPassword => field_response(
            "old_password",
            "Your old password was entered incorrectly. Please enter it again.",
        ),
        AuthError::PasswordMismatch => {
            field_response("new_password", "The two password fields didn't match.")
        }
        AuthError::PasswordHash | AuthError::Repository(_) => {
            detail_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn detail_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn field_response(field: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(FieldErrors::single(field, message)),
    )
        .into_response()
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
