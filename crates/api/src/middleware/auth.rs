//! Authentication extractor.
//!
//! Resolves the bearer token from the `Authorization` header to the
//! requesting principal.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::db::tokens::TokenRepository;
use crate::error::AppError;
use crate::models::user::AuthUser;
use crate::state::AppState;

/// Extractor that requires an authenticated principal.
///
/// Rejects with a 401 if the header is missing, malformed, or the token
/// is unknown.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(principal): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", principal.username)
/// }
/// ```
pub struct RequireUser(pub AuthUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;

        let user = TokenRepository::new(state.pool())
            .find_user(token)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(Self(user))
    }
}

/// Pull the token out of the `Authorization` header.
///
/// Accepts both `Token <key>` (the original API's scheme) and
/// `Bearer <key>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();

    if token.is_empty() {
        return None;
    }

    match scheme {
        "Token" | "Bearer" => Some(token),
        _ => None,
    }
}
