//! Cart and cart item repositories.
//!
//! Every read and write here is scoped to an owner: the SQL predicate
//! `carts.user_id = $owner` (directly, or via a join for items) is the
//! ownership model. An ID outside the caller's visible set behaves
//! exactly like a missing row, so handlers answer 404, never 403.

use sqlx::PgPool;

use tradewind_core::{CartId, CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem, CartItemChanges};

const ITEM_COLUMNS: &str = "ci.id, ci.cart_id, ci.product_id, ci.ammount";

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the carts owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Cart>, RepositoryError> {
        let carts = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id FROM carts WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(carts)
    }

    /// Get a cart by ID, only if `owner` owns it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_owner(
        &self,
        id: CartId,
        owner: UserId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id FROM carts WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        Ok(cart)
    }

    /// Create a cart owned by `owner`. The owner is always the requesting
    /// principal; client-supplied values never reach this call.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, owner: UserId) -> Result<Cart, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carts (user_id) VALUES ($1) RETURNING id, user_id",
        )
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(cart)
    }

    /// Delete a cart, only if `owner` owns it (cascades to its items).
    ///
    /// # Returns
    ///
    /// Returns `true` if it was deleted, `false` if it wasn't visible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_owner(
        &self,
        id: CartId,
        owner: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Look up the owner of a cart, regardless of who is asking.
    ///
    /// Used by cart item creation to distinguish "no such cart" (a field
    /// validation error) from "someone else's cart" (an authorization
    /// failure).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner_of(&self, id: CartId) -> Result<Option<UserId>, RepositoryError> {
        let owner: Option<(UserId,)> = sqlx::query_as("SELECT user_id FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(owner.map(|(id,)| id))
    }
}

/// Repository for cart item operations.
pub struct CartItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartItemRepository<'a> {
    /// Create a new cart item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the items in carts owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM cart_items ci \
             JOIN carts c ON c.id = ci.cart_id \
             WHERE c.user_id = $1 \
             ORDER BY ci.id ASC"
        );

        let items = sqlx::query_as::<_, CartItem>(&sql)
            .bind(owner)
            .fetch_all(self.pool)
            .await?;

        Ok(items)
    }

    /// Get a cart item by ID, only if its cart belongs to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_owner(
        &self,
        id: CartItemId,
        owner: UserId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM cart_items ci \
             JOIN carts c ON c.id = ci.cart_id \
             WHERE ci.id = $1 AND c.user_id = $2"
        );

        let item = sqlx::query_as::<_, CartItem>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(self.pool)
            .await?;

        Ok(item)
    }

    /// Create a cart item. The caller has already verified cart ownership
    /// and that the product exists; no stock check is performed and
    /// duplicate lines for the same product are allowed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        ammount: i64,
    ) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(
            "INSERT INTO cart_items (cart_id, product_id, ammount) \
             VALUES ($1, $2, $3) \
             RETURNING id, cart_id, product_id, ammount",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(ammount)
        .fetch_one(self.pool)
        .await?;

        Ok(item)
    }

    /// Apply a partial update, only if the item's current cart belongs to
    /// `owner`; `None` fields keep their value.
    ///
    /// Returns `None` if the item isn't visible to `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_for_owner(
        &self,
        id: CartItemId,
        owner: UserId,
        changes: &CartItemChanges,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(
            "UPDATE cart_items ci SET \
             cart_id = COALESCE($3, ci.cart_id), \
             product_id = COALESCE($4, ci.product_id), \
             ammount = COALESCE($5, ci.ammount) \
             FROM carts c \
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2 \
             RETURNING ci.id, ci.cart_id, ci.product_id, ci.ammount",
        )
        .bind(id)
        .bind(owner)
        .bind(changes.cart_id)
        .bind(changes.product_id)
        .bind(changes.ammount)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// Delete a cart item, only if its cart belongs to `owner`.
    ///
    /// # Returns
    ///
    /// Returns `true` if it was deleted, `false` if it wasn't visible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_owner(
        &self,
        id: CartItemId,
        owner: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM cart_items ci \
             USING carts c \
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
