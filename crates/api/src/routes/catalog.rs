//! Catalog route handlers (product types and products).
//!
//! Pure CRUD with declarative field validation; no authentication is
//! required on these endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use tradewind_core::{ProductId, ProductTypeId};

use crate::db::catalog::{ProductRepository, ProductTypeRepository};
use crate::error::{AppError, FieldErrors, Result};
use crate::models::catalog::{NewProduct, Product, ProductChanges, ProductType};
use crate::state::AppState;

/// Maximum length of a product or product type name.
const MAX_NAME_LENGTH: usize = 128;

/// Maximum length of a product description.
const MAX_DESCRIPTION_LENGTH: usize = 4096;

// =============================================================================
// Payload Types
// =============================================================================

/// Create payload for a product type. Fields are optional so missing
/// ones surface as field errors rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct ProductTypePayload {
    pub name: Option<String>,
}

/// Create payload for a product.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<i64>,
    pub price: Option<i64>,
    pub ammount: Option<i64>,
}

/// Partial update payload for a product.
#[derive(Debug, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<i64>,
    pub price: Option<i64>,
    pub ammount: Option<i64>,
}

// =============================================================================
// Product Types
// =============================================================================

/// `GET /product-types` - List all product types.
pub async fn list_product_types(State(state): State<AppState>) -> Result<Json<Vec<ProductType>>> {
    let types = ProductTypeRepository::new(state.pool()).list().await?;
    Ok(Json(types))
}

/// `POST /product-types` - Create a product type.
pub async fn create_product_type(
    State(state): State<AppState>,
    Json(payload): Json<ProductTypePayload>,
) -> Result<(StatusCode, Json<ProductType>)> {
    let mut errors = FieldErrors::new();
    let name = validate_name(&mut errors, payload.name, "Product type name is too long!");
    errors.into_result()?;

    let name = name.unwrap_or_default();
    let created = ProductTypeRepository::new(state.pool()).create(&name).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /product-types/{id}` - Retrieve a product type.
pub async fn get_product_type(
    State(state): State<AppState>,
    Path(id): Path<ProductTypeId>,
) -> Result<Json<ProductType>> {
    let found = ProductTypeRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(found))
}

/// `PATCH /product-types/{id}` - Update a product type.
pub async fn update_product_type(
    State(state): State<AppState>,
    Path(id): Path<ProductTypeId>,
    Json(payload): Json<ProductTypePayload>,
) -> Result<Json<ProductType>> {
    let mut errors = FieldErrors::new();
    let name = match payload.name {
        Some(name) => {
            check_name(&mut errors, &name, "Product type name is too long!");
            Some(name)
        }
        None => None,
    };
    errors.into_result()?;

    let updated = ProductTypeRepository::new(state.pool())
        .update(id, name.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(updated))
}

/// `DELETE /product-types/{id}` - Delete a product type.
///
/// Cascades to all products of that type, which cascades to any cart
/// items referencing those products.
pub async fn delete_product_type(
    State(state): State<AppState>,
    Path(id): Path<ProductTypeId>,
) -> Result<StatusCode> {
    let deleted = ProductTypeRepository::new(state.pool()).delete(id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// =============================================================================
// Products
// =============================================================================

/// `GET /products` - List all products.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// `POST /products` - Create a product.
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    let mut errors = FieldErrors::new();

    let name = validate_name(&mut errors, payload.name, "Product name is too long!");
    let description = payload.description.unwrap_or_default();
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.push("description", "Product description is too long!");
    }
    let price = validate_non_negative(&mut errors, payload.price, "price", "Price cannot be negative!");
    let ammount =
        validate_non_negative(&mut errors, payload.ammount, "ammount", "Ammount cannot be negative!");

    let product_type = match payload.product_type {
        Some(raw) => {
            let id = ProductTypeId::new(raw);
            if ProductTypeRepository::new(state.pool()).exists(id).await? {
                Some(id)
            } else {
                errors.push("type", format!("Invalid pk \"{raw}\" - object does not exist."));
                None
            }
        }
        None => {
            errors.push("type", "This field is required.");
            None
        }
    };

    errors.into_result()?;

    // All fields validated above; the defaults are unreachable.
    let new = NewProduct {
        name: name.unwrap_or_default(),
        description,
        product_type_id: product_type.unwrap_or(ProductTypeId::new(0)),
        price: price.unwrap_or_default(),
        ammount: ammount.unwrap_or_default(),
    };

    let created = ProductRepository::new(state.pool()).create(&new).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /products/{id}` - Retrieve a product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let found = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(found))
}

/// `PATCH /products/{id}` - Update a product.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPatch>,
) -> Result<Json<Product>> {
    let mut errors = FieldErrors::new();

    if let Some(ref name) = payload.name {
        check_name(&mut errors, name, "Product name is too long!");
    }
    if let Some(ref description) = payload.description
        && description.chars().count() > MAX_DESCRIPTION_LENGTH
    {
        errors.push("description", "Product description is too long!");
    }
    if payload.price.is_some_and(|p| p < 0) {
        errors.push("price", "Price cannot be negative!");
    }
    if payload.ammount.is_some_and(|a| a < 0) {
        errors.push("ammount", "Ammount cannot be negative!");
    }

    let product_type = match payload.product_type {
        Some(raw) => {
            let type_id = ProductTypeId::new(raw);
            if ProductTypeRepository::new(state.pool()).exists(type_id).await? {
                Some(type_id)
            } else {
                errors.push("type", format!("Invalid pk \"{raw}\" - object does not exist."));
                None
            }
        }
        None => None,
    };

    errors.into_result()?;

    let changes = ProductChanges {
        name: payload.name,
        description: payload.description,
        product_type_id: product_type,
        price: payload.price,
        ammount: payload.ammount,
    };

    let updated = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(updated))
}

/// `DELETE /products/{id}` - Delete a product.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let deleted = ProductRepository::new(state.pool()).delete(id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

/// Validate a required name field, returning it when present.
fn validate_name(
    errors: &mut FieldErrors,
    name: Option<String>,
    too_long_message: &str,
) -> Option<String> {
    match name {
        Some(name) => {
            check_name(errors, &name, too_long_message);
            Some(name)
        }
        None => {
            errors.push("name", "This field is required.");
            None
        }
    }
}

/// Check an already-present name against blankness and the length cap.
fn check_name(errors: &mut FieldErrors, name: &str, too_long_message: &str) {
    if name.is_empty() {
        errors.push("name", "This field may not be blank.");
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push("name", too_long_message);
    }
}

/// Validate a required non-negative integer field.
fn validate_non_negative(
    errors: &mut FieldErrors,
    value: Option<i64>,
    field: &str,
    negative_message: &str,
) -> Option<i64> {
    match value {
        Some(value) if value < 0 => {
            errors.push(field, negative_message);
            None
        }
        Some(value) => Some(value),
        None => {
            errors.push(field, "This field is required.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name_blank() {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, "", "too long!");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_check_name_too_long() {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &"x".repeat(129), "too long!");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_check_name_at_cap_is_ok() {
        let mut errors = FieldErrors::new();
        check_name(&mut errors, &"x".repeat(128), "too long!");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_non_negative() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            validate_non_negative(&mut errors, Some(0), "price", "negative!"),
            Some(0)
        );
        assert!(errors.is_empty());

        assert_eq!(
            validate_non_negative(&mut errors, Some(-1), "price", "negative!"),
            None
        );
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_validate_non_negative_missing() {
        let mut errors = FieldErrors::new();
        assert_eq!(validate_non_negative(&mut errors, None, "price", "negative!"), None);
        assert!(!errors.is_empty());
    }
}
