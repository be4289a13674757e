//! Cart domain types.

use serde::Serialize;
use sqlx::FromRow;

use tradewind_core::{CartId, CartItemId, ProductId, UserId};

/// A shopping cart, exclusively owned by one user.
///
/// A user may own any number of carts; nothing deduplicates them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
    pub id: CartId,
    /// Owning user; always the requesting principal on create.
    #[serde(rename = "user")]
    pub user_id: UserId,
}

/// A line in a cart.
///
/// Valid only while both its cart and its product exist (cascade delete
/// on either). Quantity is never checked against product stock, and
/// duplicate lines for the same product are allowed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(rename = "cart")]
    pub cart_id: CartId,
    #[serde(rename = "product")]
    pub product_id: ProductId,
    pub ammount: i64,
}

/// Validated partial update for a cart item. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct CartItemChanges {
    pub cart_id: Option<CartId>,
    pub product_id: Option<ProductId>,
    pub ammount: Option<i64>,
}
