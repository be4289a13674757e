//! User route handlers.
//!
//! Registration and login are open; everything else goes through the
//! access decision table in [`crate::services::access`]. Object-level
//! denials on the user resource are explicit 403s, unlike carts where
//! foreign rows simply read as missing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use tradewind_core::{Email, PhoneNumber, UserId, Username, UsernameError};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::error::{AppError, FieldErrors, Result};
use crate::middleware::RequireUser;
use crate::models::user::{NewUser, User, UserChanges};
use crate::services::access::{self, UserAction};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Minimum accepted password length, mirrored from the auth service so
/// registration can report it as a field error on `password`.
const MIN_PASSWORD_LENGTH: usize = 8;

/// The message DRF-era clients expect on a capability denial.
const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

// =============================================================================
// Payload Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Change-password payload.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordPayload {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Profile update payload. Absent fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
}

/// Response for registration and login: the user plus their token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// =============================================================================
// Registration / Login
// =============================================================================

/// `POST /user/register` - Create an account and issue its token.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let mut errors = FieldErrors::new();

    let username = parse_username(&mut errors, payload.username, true);
    let email = parse_email(&mut errors, payload.email, true);
    let phone_number = parse_phone(&mut errors, payload.phone_number);

    let password = match payload.password {
        Some(password) if password.is_empty() => {
            errors.push("password", "This field may not be blank.");
            None
        }
        Some(password) if password.len() < MIN_PASSWORD_LENGTH => {
            errors.push(
                "password",
                format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
            );
            None
        }
        Some(password) => Some(password),
        None => {
            errors.push("password", "This field is required.");
            None
        }
    };

    errors.into_result()?;

    // Presence was validated above, so these are always populated.
    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(AppError::Internal("registration fields missing after validation".to_string()));
    };

    let new = NewUser {
        username,
        email,
        first_name: payload.first_name.unwrap_or_default(),
        last_name: payload.last_name.unwrap_or_default(),
        phone_number,
        delivery_address: payload.delivery_address.unwrap_or_default(),
    };

    let (user, token) = AuthService::new(state.pool()).register(&new, &password).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// `POST /user/login` - Exchange credentials for the user's token.
///
/// Repeated logins return the same token value.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>> {
    let mut errors = FieldErrors::new();
    if payload.username.is_none() {
        errors.push("username", "This field is required.");
    }
    if payload.password.is_none() {
        errors.push("password", "This field is required.");
    }
    errors.into_result()?;

    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let (user, token) = AuthService::new(state.pool()).login(&username, &password).await?;

    Ok(Json(AuthResponse { user, token }))
}

// =============================================================================
// Self-Service
// =============================================================================

/// `POST /user/change-password` - Change the caller's own password.
///
/// Old sessions are invalidated; the bearer token stays valid.
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<serde_json::Value>> {
    let mut errors = FieldErrors::new();
    if payload.old_password.is_none() {
        errors.push("old_password", "This field is required.");
    }
    if payload.new_password.is_none() {
        errors.push("new_password", "This field is required.");
    }
    if payload.confirm_password.is_none() {
        errors.push("confirm_password", "This field is required.");
    }
    errors.into_result()?;

    AuthService::new(state.pool())
        .change_password(
            principal.id,
            &payload.old_password.unwrap_or_default(),
            &payload.new_password.unwrap_or_default(),
            &payload.confirm_password.unwrap_or_default(),
        )
        .await?;

    tracing::info!(user_id = %principal.id, "password changed");

    Ok(Json(json!({ "status": "password_changed" })))
}

/// `GET /user/username` - Return the caller's own username.
pub async fn username(RequireUser(principal): RequireUser) -> Json<serde_json::Value> {
    Json(json!({ "username": principal.username }))
}

// =============================================================================
// Administration
// =============================================================================

/// `GET /user` - List all users. Staff only.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Vec<User>>> {
    if !access::permits_action(Some(&principal), UserAction::List) {
        return Err(AppError::Forbidden(PERMISSION_DENIED.to_string()));
    }

    let users = UserRepository::new(state.pool()).list().await?;

    Ok(Json(users))
}

/// `GET /user/{id}` - Retrieve a user. Staff or self.
pub async fn retrieve(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    if !access::permits_object(&principal, id) {
        return Err(AppError::Forbidden(PERMISSION_DENIED.to_string()));
    }

    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user))
}

/// `PATCH /user/{id}` - Update a user's profile. Staff or self.
///
/// The password is never updated here; that goes through
/// [`change_password`].
pub async fn update(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<UserId>,
    Json(payload): Json<UserPatch>,
) -> Result<Json<User>> {
    if !access::permits_object(&principal, id) {
        return Err(AppError::Forbidden(PERMISSION_DENIED.to_string()));
    }

    let mut errors = FieldErrors::new();
    let username = parse_username(&mut errors, payload.username, false);
    let email = parse_email(&mut errors, payload.email, false);
    let phone_number = parse_phone(&mut errors, payload.phone_number);
    errors.into_result()?;

    let changes = UserChanges {
        username,
        email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone_number,
        delivery_address: payload.delivery_address,
    };

    let updated = UserRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(conflict_to_field_error)?
        .ok_or(AppError::NotFound)?;

    Ok(Json(updated))
}

/// `DELETE /user/{id}` - Delete a user. Staff or self.
///
/// Cascades to the user's carts, their items, and the token.
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if !access::permits_object(&principal, id) {
        return Err(AppError::Forbidden(PERMISSION_DENIED.to_string()));
    }

    let deleted = UserRepository::new(state.pool()).delete(id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn parse_username(
    errors: &mut FieldErrors,
    value: Option<String>,
    required: bool,
) -> Option<Username> {
    match value {
        Some(raw) => match Username::parse(&raw) {
            Ok(username) => Some(username),
            Err(UsernameError::Empty) => {
                errors.push("username", "This field may not be blank.");
                None
            }
            Err(err) => {
                errors.push("username", err.to_string());
                None
            }
        },
        None if required => {
            errors.push("username", "This field is required.");
            None
        }
        None => None,
    }
}

fn parse_email(errors: &mut FieldErrors, value: Option<String>, required: bool) -> Option<Email> {
    match value {
        Some(raw) => match Email::parse(&raw) {
            Ok(email) => Some(email),
            Err(_) => {
                errors.push("email", "Enter a valid email address.");
                None
            }
        },
        None if required => {
            errors.push("email", "This field is required.");
            None
        }
        None => None,
    }
}

fn parse_phone(errors: &mut FieldErrors, value: Option<String>) -> Option<PhoneNumber> {
    match value {
        Some(raw) => match PhoneNumber::parse(&raw) {
            Ok(phone) => Some(phone),
            Err(err) => {
                errors.push("phone_number", err.to_string());
                None
            }
        },
        None => None,
    }
}

/// Map a username/email unique violation on update to the same field
/// error shape registration produces.
fn conflict_to_field_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(field) if field == "username" => AppError::Validation(
            FieldErrors::single("username", "A user with that username already exists."),
        ),
        RepositoryError::Conflict(_) => AppError::Validation(FieldErrors::single(
            "email",
            "A user with that email already exists.",
        )),
        other => AppError::Database(other),
    }
}
