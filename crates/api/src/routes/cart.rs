//! Cart and cart item route handlers.
//!
//! Everything here requires authentication and is scoped to the
//! requesting principal's carts. IDs outside that set read as missing
//! rows, so cross-user probes get a 404 instead of leaking existence.
//! The one exception is cart item creation, where naming someone
//! else's cart is an explicit 403.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use tradewind_core::{CartId, CartItemId, ProductId};

use crate::db::carts::{CartItemRepository, CartRepository};
use crate::db::catalog::ProductRepository;
use crate::error::{AppError, FieldErrors, Result};
use crate::middleware::RequireUser;
use crate::models::cart::{Cart, CartItem, CartItemChanges};
use crate::state::AppState;

// =============================================================================
// Payload Types
// =============================================================================

/// Create payload for a cart item.
#[derive(Debug, Deserialize)]
pub struct CartItemPayload {
    pub cart: Option<i64>,
    pub product: Option<i64>,
    pub ammount: Option<i64>,
}

// =============================================================================
// Carts
// =============================================================================

/// `GET /cart` - List the caller's carts.
pub async fn list_carts(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Vec<Cart>>> {
    let carts = CartRepository::new(state.pool())
        .list_for_owner(principal.id)
        .await?;

    Ok(Json(carts))
}

/// `POST /cart` - Create a cart owned by the caller.
///
/// The body is optional and ignored; a client-supplied `user` value
/// never overrides the authenticated principal.
pub async fn create_cart(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    _body: Option<Json<serde_json::Value>>,
) -> Result<(StatusCode, Json<Cart>)> {
    let cart = CartRepository::new(state.pool()).create(principal.id).await?;

    Ok((StatusCode::CREATED, Json(cart)))
}

/// `GET /cart/{id}` - Retrieve one of the caller's carts.
pub async fn get_cart(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<CartId>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_for_owner(id, principal.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(cart))
}

/// `PATCH /cart/{id}` - Update one of the caller's carts.
///
/// A cart's only mutable field is its owner, and the owner is forced to
/// the principal, so this verifies visibility and returns the row.
pub async fn update_cart(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<CartId>,
    _body: Option<Json<serde_json::Value>>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_for_owner(id, principal.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(cart))
}

/// `DELETE /cart/{id}` - Delete one of the caller's carts.
///
/// Cascades to the cart's items.
pub async fn delete_cart(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<CartId>,
) -> Result<StatusCode> {
    let deleted = CartRepository::new(state.pool())
        .delete_for_owner(id, principal.id)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// =============================================================================
// Cart Items
// =============================================================================

/// `GET /cart-items` - List the items in the caller's carts.
pub async fn list_cart_items(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartItemRepository::new(state.pool())
        .list_for_owner(principal.id)
        .await?;

    Ok(Json(items))
}

/// `POST /cart-items` - Add an item to one of the caller's carts.
///
/// A nonexistent cart or product is a field validation error; an
/// existing cart owned by someone else is an authorization failure.
pub async fn create_cart_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Json(payload): Json<CartItemPayload>,
) -> Result<(StatusCode, Json<CartItem>)> {
    let mut errors = FieldErrors::new();

    let cart_id = match payload.cart {
        Some(raw) => Some(CartId::new(raw)),
        None => {
            errors.push("cart", "This field is required.");
            None
        }
    };
    let product_id = match payload.product {
        Some(raw) => Some(ProductId::new(raw)),
        None => {
            errors.push("product", "This field is required.");
            None
        }
    };
    let ammount = match payload.ammount {
        Some(ammount) if ammount < 0 => {
            errors.push("ammount", "Ammount cannot be negative!");
            None
        }
        Some(ammount) => Some(ammount),
        None => {
            errors.push("ammount", "This field is required.");
            None
        }
    };
    errors.into_result()?;

    // Presence was validated above, so these are always populated.
    let (Some(cart_id), Some(product_id), Some(ammount)) = (cart_id, product_id, ammount) else {
        return Err(AppError::Internal("cart item fields missing after validation".to_string()));
    };

    match CartRepository::new(state.pool()).owner_of(cart_id).await? {
        None => {
            return Err(AppError::Validation(FieldErrors::single(
                "cart",
                format!("Invalid pk \"{cart_id}\" - object does not exist."),
            )));
        }
        Some(owner) if owner != principal.id => {
            return Err(AppError::Forbidden(
                "You do not have permission to add items to this cart.".to_string(),
            ));
        }
        Some(_) => {}
    }

    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::Validation(FieldErrors::single(
            "product",
            format!("Invalid pk \"{product_id}\" - object does not exist."),
        )));
    }

    let item = CartItemRepository::new(state.pool())
        .create(cart_id, product_id, ammount)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /cart-items/{id}` - Retrieve an item from one of the caller's carts.
pub async fn get_cart_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartItem>> {
    let item = CartItemRepository::new(state.pool())
        .get_for_owner(id, principal.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(item))
}

/// `PATCH /cart-items/{id}` - Update an item in one of the caller's carts.
///
/// A supplied `cart` must be one of the caller's own carts; moving an
/// item into someone else's cart is refused the same way creating there
/// is.
pub async fn update_cart_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<CartItemId>,
    Json(payload): Json<CartItemPayload>,
) -> Result<Json<CartItem>> {
    let mut errors = FieldErrors::new();

    if payload.ammount.is_some_and(|a| a < 0) {
        errors.push("ammount", "Ammount cannot be negative!");
    }
    errors.into_result()?;

    let cart_id = match payload.cart {
        Some(raw) => {
            let cart_id = CartId::new(raw);
            match CartRepository::new(state.pool()).owner_of(cart_id).await? {
                None => {
                    return Err(AppError::Validation(FieldErrors::single(
                        "cart",
                        format!("Invalid pk \"{cart_id}\" - object does not exist."),
                    )));
                }
                Some(owner) if owner != principal.id => {
                    return Err(AppError::Forbidden(
                        "You do not have permission to add items to this cart.".to_string(),
                    ));
                }
                Some(_) => Some(cart_id),
            }
        }
        None => None,
    };

    let product_id = match payload.product {
        Some(raw) => {
            let product_id = ProductId::new(raw);
            if ProductRepository::new(state.pool()).exists(product_id).await? {
                Some(product_id)
            } else {
                return Err(AppError::Validation(FieldErrors::single(
                    "product",
                    format!("Invalid pk \"{product_id}\" - object does not exist."),
                )));
            }
        }
        None => None,
    };

    let changes = CartItemChanges {
        cart_id,
        product_id,
        ammount: payload.ammount,
    };

    let item = CartItemRepository::new(state.pool())
        .update_for_owner(id, principal.id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(item))
}

/// `DELETE /cart-items/{id}` - Delete an item from one of the caller's carts.
pub async fn delete_cart_item(
    State(state): State<AppState>,
    RequireUser(principal): RequireUser,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    let deleted = CartItemRepository::new(state.pool())
        .delete_for_owner(id, principal.id)
        .await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
