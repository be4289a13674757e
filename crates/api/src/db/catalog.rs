//! Catalog repositories (product types and products).
//!
//! Pure CRUD. Deleting a product type cascades to its products, which
//! cascades to any cart items referencing them.

use sqlx::PgPool;

use tradewind_core::{ProductId, ProductTypeId};

use super::RepositoryError;
use crate::models::catalog::{NewProduct, Product, ProductChanges, ProductType};

const PRODUCT_COLUMNS: &str = "id, name, description, product_type_id, price, ammount";

/// Repository for product type operations.
pub struct ProductTypeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductTypeRepository<'a> {
    /// Create a new product type repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all product types, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ProductType>, RepositoryError> {
        let types =
            sqlx::query_as::<_, ProductType>("SELECT id, name FROM product_types ORDER BY id ASC")
                .fetch_all(self.pool)
                .await?;

        Ok(types)
    }

    /// Get a product type by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductTypeId) -> Result<Option<ProductType>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductType>(
            "SELECT id, name FROM product_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Whether a product type with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductTypeId) -> Result<bool, RepositoryError> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM product_types WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(found)
    }

    /// Create a product type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, name: &str) -> Result<ProductType, RepositoryError> {
        let row = sqlx::query_as::<_, ProductType>(
            "INSERT INTO product_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Rename a product type; `None` keeps the current name.
    ///
    /// Returns `None` if the product type doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductTypeId,
        name: Option<&str>,
    ) -> Result<Option<ProductType>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductType>(
            "UPDATE product_types SET name = COALESCE($2, name) WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a product type (cascades to its products).
    ///
    /// # Returns
    ///
    /// Returns `true` if it was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductTypeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_types WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC");

        let products = sqlx::query_as::<_, Product>(&sql).fetch_all(self.pool).await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Whether a product with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(found)
    }

    /// Create a product. The caller has already validated field
    /// constraints and the product type reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products (name, description, product_type_id, price, ammount) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.product_type_id)
            .bind(new.price)
            .bind(new.ammount)
            .fetch_one(self.pool)
            .await?;

        Ok(row)
    }

    /// Apply a partial update; `None` fields keep their value.
    ///
    /// Returns `None` if the product doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "UPDATE products SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             product_type_id = COALESCE($4, product_type_id), \
             price = COALESCE($5, price), \
             ammount = COALESCE($6, ammount) \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(changes.product_type_id)
            .bind(changes.price)
            .bind(changes.ammount)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Delete a product (cascades to cart items referencing it).
    ///
    /// # Returns
    ///
    /// Returns `true` if it was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
