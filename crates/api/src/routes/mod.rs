//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (DB ping)
//!
//! # Catalog (anonymous access permitted)
//! GET/POST   /product-types     - List / create product types
//! GET/PATCH/PUT/DELETE /product-types/{id}
//! GET/POST   /products          - List / create products
//! GET/PATCH/PUT/DELETE /products/{id}
//!
//! # Carts (authenticated, ownership-scoped)
//! GET/POST   /cart              - List / create own carts
//! GET/PATCH/PUT/DELETE /cart/{id}
//! GET/POST   /cart-items        - List / create items in own carts
//! GET/PATCH/PUT/DELETE /cart-items/{id}
//!
//! # Users
//! POST /user/register           - Create account, returns {user, token}
//! POST /user/login              - Exchange credentials for {user, token}
//! POST /user/change-password    - Authenticated, self only
//! GET  /user/username           - Authenticated, own username
//! GET  /user                    - Staff only
//! GET/PATCH/PUT/DELETE /user/{id} - Staff or self
//! ```
//!
//! Trailing slashes are trimmed before routing, so `/cart/` and `/cart`
//! hit the same handler.

pub mod cart;
pub mod catalog;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product type routes router.
pub fn product_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::list_product_types).post(catalog::create_product_type),
        )
        .route(
            "/{id}",
            get(catalog::get_product_type)
                .patch(catalog::update_product_type)
                .put(catalog::update_product_type)
                .delete(catalog::delete_product_type),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::list_products).post(catalog::create_product))
        .route(
            "/{id}",
            get(catalog::get_product)
                .patch(catalog::update_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list_carts).post(cart::create_cart))
        .route(
            "/{id}",
            get(cart::get_cart)
                .patch(cart::update_cart)
                .put(cart::update_cart)
                .delete(cart::delete_cart),
        )
}

/// Create the cart item routes router.
pub fn cart_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::list_cart_items).post(cart::create_cart_item))
        .route(
            "/{id}",
            get(cart::get_cart_item)
                .patch(cart::update_cart_item)
                .put(cart::update_cart_item)
                .delete(cart::delete_cart_item),
        )
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/change-password", post(users::change_password))
        .route("/username", get(users::username))
        .route(
            "/{id}",
            get(users::retrieve)
                .patch(users::update)
                .put(users::update)
                .delete(users::delete),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/product-types", product_type_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/cart-items", cart_item_routes())
        .nest("/user", user_routes())
}
