//! Catalog domain types.

use serde::Serialize;
use sqlx::FromRow;

use tradewind_core::{ProductId, ProductTypeId};

/// A product category.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductType {
    pub id: ProductTypeId,
    pub name: String,
}

/// A catalog product.
///
/// `ammount` is the quantity on hand; the spelling is part of the wire
/// format and kept for client compatibility.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Owning product type; deleting the type deletes the product.
    #[serde(rename = "type")]
    pub product_type_id: ProductTypeId,
    /// Price in minor units, never negative.
    pub price: i64,
    /// Quantity on hand, never negative.
    pub ammount: i64,
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub product_type_id: ProductTypeId,
    pub price: i64,
    pub ammount: i64,
}

/// Validated partial update for a product. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub product_type_id: Option<ProductTypeId>,
    pub price: Option<i64>,
    pub ammount: Option<i64>,
}
