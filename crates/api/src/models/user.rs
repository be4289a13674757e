//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use tradewind_core::{Email, PhoneNumber, UserId, Username};

/// A registered user (domain type).
///
/// The password hash is deliberately not part of this type; it only
/// travels through the repository and the auth service.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// User's email address (unique).
    pub email: Email,
    /// First name (may be blank).
    pub first_name: String,
    /// Last name (may be blank).
    pub last_name: String,
    /// Optional phone number.
    pub phone_number: Option<PhoneNumber>,
    /// Delivery address (may be blank).
    pub delivery_address: String,
    /// Staff users may manage other users.
    pub is_staff: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated principal attached to a request.
///
/// Resolved from the bearer token by the auth extractor; carries just
/// enough identity for ownership scoping and the staff checks.
#[derive(Debug, Clone, FromRow)]
pub struct AuthUser {
    /// ID of the authenticated user.
    pub id: UserId,
    /// Login name of the authenticated user.
    pub username: Username,
    /// Whether the user is staff.
    pub is_staff: bool,
}

/// Validated input for creating a user.
///
/// The password travels separately; it is hashed by the auth service
/// before it reaches the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<PhoneNumber>,
    pub delivery_address: String,
}

/// Validated partial update for a user's profile fields.
///
/// `None` leaves the column untouched. The password is never updated
/// through this path; that goes through the change-password flow.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<PhoneNumber>,
    pub delivery_address: Option<String>,
}
