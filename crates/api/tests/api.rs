//! End-to-end tests for the API.
//!
//! These tests require a `PostgreSQL` database reachable via the
//! `TEST_DATABASE_URL` environment variable. When it is not set, every
//! test skips itself and passes, so the suite stays green on machines
//! without a database.
//!
//! Each test spawns its own server on an ephemeral port and talks to it
//! over HTTP with reqwest, exactly like a real client.

#![allow(clippy::unwrap_used)]

use axum::ServiceExt;
use axum::extract::Request;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

use tradewind_api::config::ApiConfig;
use tradewind_api::state::AppState;

/// A running server plus a client to talk to it.
struct TestContext {
    base_url: String,
    client: Client,
}

/// Spawn the full application against the test database.
///
/// Returns `None` when `TEST_DATABASE_URL` is unset.
async fn spawn_server() -> Option<TestContext> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let config = ApiConfig {
        database_url: SecretString::from(database_url),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        sentry_dsn: None,
        sentry_environment: None,
    };

    let router = tradewind_api::app(AppState::new(config, pool));
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .await
            .unwrap();
    });

    Some(TestContext {
        base_url: format!("http://{addr}"),
        client: Client::new(),
    })
}

/// Skip the test when no database is configured.
macro_rules! require_db {
    () => {
        match spawn_server().await {
            Some(ctx) => ctx,
            None => return,
        }
    };
}

/// A unique username/email suffix so runs never collide.
fn unique(prefix: &str) -> String {
    format!("{prefix}{:08x}", rand::random::<u32>())
}

impl TestContext {
    /// Register a fresh user; returns `(user, token)`.
    async fn register(&self, username: &str, password: &str) -> (Value, String) {
        let resp = self
            .client
            .post(format!("{}/user/register", self.base_url))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = resp.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_owned();
        (body["user"].clone(), token)
    }

    /// Create a product type and a product of it; returns their ids.
    async fn seed_product(&self) -> (i64, i64) {
        let resp = self
            .client
            .post(format!("{}/product-types", self.base_url))
            .json(&json!({ "name": unique("type-") }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let type_id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

        let resp = self
            .client
            .post(format!("{}/products", self.base_url))
            .json(&json!({
                "name": unique("product-"),
                "description": "test product",
                "type": type_id,
                "price": 1000,
                "ammount": 5,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let product_id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

        (type_id, product_id)
    }

    /// Create a cart for the given token; returns its id.
    async fn create_cart(&self, token: &str) -> i64 {
        let resp = self
            .client
            .post(format!("{}/cart", self.base_url))
            .header("Authorization", format!("Token {token}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = require_db!();

    let resp = ctx
        .client
        .get(format!("{}/health", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(format!("{}/health/ready", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
async fn test_register_returns_user_and_token() {
    let ctx = require_db!();

    let username = unique("alice");
    let (user, token) = ctx.register(&username, "correct-horse").await;

    assert_eq!(user["username"], username.as_str());
    assert_eq!(user["is_staff"], false);
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
    assert_eq!(token.len(), 40);
}

#[tokio::test]
async fn test_login_returns_same_token_every_time() {
    let ctx = require_db!();

    let username = unique("alice");
    let (_, register_token) = ctx.register(&username, "correct-horse").await;

    for _ in 0..2 {
        let resp = ctx
            .client
            .post(format!("{}/user/login", ctx.base_url))
            .json(&json!({ "username": username, "password": "correct-horse" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["token"].as_str().unwrap(), register_token);
    }
}

#[tokio::test]
async fn test_login_wrong_password_is_uniform_401() {
    let ctx = require_db!();

    let username = unique("alice");
    ctx.register(&username, "correct-horse").await;

    // Wrong password and unknown username produce identical responses.
    for (user, password) in [(username.as_str(), "wrong"), ("no-such-user", "wrong")] {
        let resp = ctx
            .client
            .post(format!("{}/user/login", ctx.base_url))
            .json(&json!({ "username": user, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["detail"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let ctx = require_db!();

    let username = unique("alice");
    ctx.register(&username, "correct-horse").await;

    let resp = ctx
        .client
        .post(format!("{}/user/register", ctx.base_url))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", unique("other")),
            "password": "correct-horse",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"][0], "A user with that username already exists.");
}

#[tokio::test]
async fn test_register_missing_fields() {
    let ctx = require_db!();

    let resp = ctx
        .client
        .post(format!("{}/user/register", ctx.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    for field in ["username", "email", "password"] {
        assert_eq!(body[field][0], "This field is required.", "field: {field}");
    }
}

#[tokio::test]
async fn test_register_short_password() {
    let ctx = require_db!();

    let resp = ctx
        .client
        .post(format!("{}/user/register", ctx.base_url))
        .json(&json!({
            "username": unique("alice"),
            "email": format!("{}@example.com", unique("alice")),
            "password": "short",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["password"][0].as_str().unwrap().contains("at least 8"));
}

#[tokio::test]
async fn test_register_invalid_phone_number() {
    let ctx = require_db!();

    let resp = ctx
        .client
        .post(format!("{}/user/register", ctx.base_url))
        .json(&json!({
            "username": unique("alice"),
            "email": format!("{}@example.com", unique("alice")),
            "password": "correct-horse",
            "phone_number": "abc123",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["phone_number"][0],
        "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed."
    );
}

// ============================================================================
// Password Change
// ============================================================================

#[tokio::test]
async fn test_change_password_flow() {
    let ctx = require_db!();

    let username = unique("alice");
    let (_, token) = ctx.register(&username, "old-password").await;
    let auth = format!("Token {token}");
    let url = format!("{}/user/change-password", ctx.base_url);

    // Wrong old password
    let resp = ctx
        .client
        .post(&url)
        .header("Authorization", &auth)
        .json(&json!({
            "old_password": "not-the-old-one",
            "new_password": "new-password",
            "confirm_password": "new-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["old_password"][0],
        "Your old password was entered incorrectly. Please enter it again."
    );

    // Confirmation mismatch
    let resp = ctx
        .client
        .post(&url)
        .header("Authorization", &auth)
        .json(&json!({
            "old_password": "old-password",
            "new_password": "new-password",
            "confirm_password": "different",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["new_password"][0], "The two password fields didn't match.");

    // Success
    let resp = ctx
        .client
        .post(&url)
        .header("Authorization", &auth)
        .json(&json!({
            "old_password": "old-password",
            "new_password": "new-password",
            "confirm_password": "new-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // New password logs in; the token survived the change.
    let resp = ctx
        .client
        .post(format!("{}/user/login", ctx.base_url))
        .json(&json!({ "username": username, "password": "new-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(format!("{}/user/username", ctx.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["username"], username.as_str());
}

// ============================================================================
// User Permissions
// ============================================================================

#[tokio::test]
async fn test_user_endpoints_require_authentication() {
    let ctx = require_db!();

    for path in ["/user", "/user/username", "/user/1"] {
        let resp = ctx
            .client
            .get(format!("{}{path}", ctx.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path: {path}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["detail"], "Authentication credentials were not provided.");
    }
}

#[tokio::test]
async fn test_user_list_is_staff_only() {
    let ctx = require_db!();

    let (_, token) = ctx.register(&unique("alice"), "correct-horse").await;

    let resp = ctx
        .client
        .get(format!("{}/user", ctx.base_url))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_retrieve_self_but_not_others() {
    let ctx = require_db!();

    let (alice, alice_token) = ctx.register(&unique("alice"), "correct-horse").await;
    let (bob, _) = ctx.register(&unique("bob"), "correct-horse").await;
    let auth = format!("Token {alice_token}");

    let resp = ctx
        .client
        .get(format!("{}/user/{}", ctx.base_url, alice["id"]))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Another user's row is an explicit denial, not a 404.
    let resp = ctx
        .client
        .get(format!("{}/user/{}", ctx.base_url, bob["id"]))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_update_own_profile() {
    let ctx = require_db!();

    let (alice, token) = ctx.register(&unique("alice"), "correct-horse").await;

    let resp = ctx
        .client
        .patch(format!("{}/user/{}", ctx.base_url, alice["id"]))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "first_name": "Alice", "delivery_address": "1 Main St" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["first_name"], "Alice");
    assert_eq!(body["delivery_address"], "1 Main St");
    // Untouched fields keep their values.
    assert_eq!(body["username"], alice["username"]);
}

#[tokio::test]
async fn test_user_delete_self() {
    let ctx = require_db!();

    let username = unique("alice");
    let (alice, token) = ctx.register(&username, "correct-horse").await;
    let auth = format!("Token {token}");

    let resp = ctx
        .client
        .delete(format!("{}/user/{}", ctx.base_url, alice["id"]))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // The token died with the user.
    let resp = ctx
        .client
        .get(format!("{}/user/username", ctx.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_crud_is_anonymous() {
    let ctx = require_db!();

    let (type_id, product_id) = ctx.seed_product().await;

    let resp = ctx
        .client
        .get(format!("{}/product-types/{type_id}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(format!("{}/products/{product_id}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["type"], type_id);
    assert_eq!(body["price"], 1000);
    assert_eq!(body["ammount"], 5);

    let resp = ctx
        .client
        .patch(format!("{}/products/{product_id}", ctx.base_url))
        .json(&json!({ "price": 1500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["price"], 1500);

    let resp = ctx
        .client
        .delete(format!("{}/products/{product_id}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .client
        .get(format!("{}/products/{product_id}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Not found.");
}

#[tokio::test]
async fn test_product_validation_messages() {
    let ctx = require_db!();

    let (type_id, _) = ctx.seed_product().await;

    let resp = ctx
        .client
        .post(format!("{}/products", ctx.base_url))
        .json(&json!({
            "name": "n".repeat(129),
            "description": "d".repeat(4097),
            "type": type_id,
            "price": -1,
            "ammount": -1,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"][0], "Product name is too long!");
    assert_eq!(body["description"][0], "Product description is too long!");
    assert_eq!(body["price"][0], "Price cannot be negative!");
    assert_eq!(body["ammount"][0], "Ammount cannot be negative!");
}

#[tokio::test]
async fn test_product_with_unknown_type() {
    let ctx = require_db!();

    let resp = ctx
        .client
        .post(format!("{}/products", ctx.base_url))
        .json(&json!({
            "name": "widget",
            "description": "",
            "type": 999_999_999,
            "price": 1,
            "ammount": 1,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["type"][0], "Invalid pk \"999999999\" - object does not exist.");
}

#[tokio::test]
async fn test_deleting_product_type_cascades() {
    let ctx = require_db!();

    let (type_id, product_id) = ctx.seed_product().await;

    let resp = ctx
        .client
        .delete(format!("{}/product-types/{type_id}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .client
        .get(format!("{}/products/{product_id}", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Carts
// ============================================================================

#[tokio::test]
async fn test_cart_requires_authentication() {
    let ctx = require_db!();

    for path in ["/cart", "/cart-items"] {
        let resp = ctx
            .client
            .get(format!("{}{path}", ctx.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path: {path}");
    }
}

#[tokio::test]
async fn test_cart_is_owned_by_principal() {
    let ctx = require_db!();

    let (alice, token) = ctx.register(&unique("alice"), "correct-horse").await;

    let resp = ctx
        .client
        .post(format!("{}/cart", ctx.base_url))
        .header("Authorization", format!("Token {token}"))
        // A client-supplied owner is ignored.
        .json(&json!({ "user": 999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"], alice["id"]);
}

#[tokio::test]
async fn test_foreign_cart_reads_as_missing() {
    let ctx = require_db!();

    let (_, alice_token) = ctx.register(&unique("alice"), "correct-horse").await;
    let (_, bob_token) = ctx.register(&unique("bob"), "correct-horse").await;

    let alice_cart = ctx.create_cart(&alice_token).await;

    // Bob can't see it in his list...
    let resp = ctx
        .client
        .get(format!("{}/cart", ctx.base_url))
        .header("Authorization", format!("Token {bob_token}"))
        .send()
        .await
        .unwrap();
    let carts: Vec<Value> = resp.json().await.unwrap();
    assert!(carts.iter().all(|c| c["id"] != alice_cart));

    // ...nor retrieve or delete it directly.
    let resp = ctx
        .client
        .get(format!("{}/cart/{alice_cart}", ctx.base_url))
        .header("Authorization", format!("Token {bob_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .client
        .delete(format!("{}/cart/{alice_cart}", ctx.base_url))
        .header("Authorization", format!("Token {bob_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_may_own_multiple_carts() {
    let ctx = require_db!();

    let (_, token) = ctx.register(&unique("alice"), "correct-horse").await;
    let first = ctx.create_cart(&token).await;
    let second = ctx.create_cart(&token).await;
    assert_ne!(first, second);

    let resp = ctx
        .client
        .get(format!("{}/cart", ctx.base_url))
        .header("Authorization", format!("Token {token}"))
        .send()
        .await
        .unwrap();
    let carts: Vec<Value> = resp.json().await.unwrap();
    assert!(carts.len() >= 2);
}

// ============================================================================
// Cart Items
// ============================================================================

#[tokio::test]
async fn test_cart_item_lifecycle() {
    let ctx = require_db!();

    let (_, token) = ctx.register(&unique("alice"), "correct-horse").await;
    let auth = format!("Token {token}");
    let cart = ctx.create_cart(&token).await;
    let (_, product) = ctx.seed_product().await;

    // Create
    let resp = ctx
        .client
        .post(format!("{}/cart-items", ctx.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "cart": cart, "product": product, "ammount": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = resp.json().await.unwrap();
    assert_eq!(item["cart"], cart);
    assert_eq!(item["product"], product);
    assert_eq!(item["ammount"], 3);
    let item_id = item["id"].as_i64().unwrap();

    // Update quantity
    let resp = ctx
        .client
        .patch(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "ammount": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ammount"], 7);

    // Delete
    let resp = ctx
        .client
        .delete(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .client
        .get(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_item_in_unknown_cart_is_field_error() {
    let ctx = require_db!();

    let (_, token) = ctx.register(&unique("alice"), "correct-horse").await;
    let (_, product) = ctx.seed_product().await;

    let resp = ctx
        .client
        .post(format!("{}/cart-items", ctx.base_url))
        .header("Authorization", format!("Token {token}"))
        .json(&json!({ "cart": 999_999_999, "product": product, "ammount": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cart"][0], "Invalid pk \"999999999\" - object does not exist.");
}

#[tokio::test]
async fn test_cart_item_in_foreign_cart_is_forbidden() {
    let ctx = require_db!();

    let (_, alice_token) = ctx.register(&unique("alice"), "correct-horse").await;
    let (_, bob_token) = ctx.register(&unique("bob"), "correct-horse").await;
    let alice_cart = ctx.create_cart(&alice_token).await;
    let (_, product) = ctx.seed_product().await;

    let resp = ctx
        .client
        .post(format!("{}/cart-items", ctx.base_url))
        .header("Authorization", format!("Token {bob_token}"))
        .json(&json!({ "cart": alice_cart, "product": product, "ammount": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["detail"],
        "You do not have permission to add items to this cart."
    );
}

#[tokio::test]
async fn test_foreign_cart_items_read_as_missing() {
    let ctx = require_db!();

    let (_, alice_token) = ctx.register(&unique("alice"), "correct-horse").await;
    let (_, bob_token) = ctx.register(&unique("bob"), "correct-horse").await;
    let alice_cart = ctx.create_cart(&alice_token).await;
    let (_, product) = ctx.seed_product().await;
    let bob_auth = format!("Token {bob_token}");

    let resp = ctx
        .client
        .post(format!("{}/cart-items", ctx.base_url))
        .header("Authorization", format!("Token {alice_token}"))
        .json(&json!({ "cart": alice_cart, "product": product, "ammount": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item_id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    // Bob's list succeeds but excludes alice's item.
    let resp = ctx
        .client
        .get(format!("{}/cart-items", ctx.base_url))
        .header("Authorization", &bob_auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let items: Vec<Value> = resp.json().await.unwrap();
    assert!(items.iter().all(|i| i["id"] != item_id));

    // Retrieve, update, and delete by id all read as missing.
    let resp = ctx
        .client
        .get(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &bob_auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .client
        .patch(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &bob_auth)
        .json(&json!({ "ammount": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .client
        .delete(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &bob_auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The item is untouched for its owner.
    let resp = ctx
        .client
        .get(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", format!("Token {alice_token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ammount"], 2);
}

#[tokio::test]
async fn test_deleting_cart_cascades_to_items() {
    let ctx = require_db!();

    let (_, token) = ctx.register(&unique("alice"), "correct-horse").await;
    let auth = format!("Token {token}");
    let cart = ctx.create_cart(&token).await;
    let (_, product) = ctx.seed_product().await;

    let resp = ctx
        .client
        .post(format!("{}/cart-items", ctx.base_url))
        .header("Authorization", &auth)
        .json(&json!({ "cart": cart, "product": product, "ammount": 1 }))
        .send()
        .await
        .unwrap();
    let item_id = resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .delete(format!("{}/cart/{cart}", ctx.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ctx
        .client
        .get(format!("{}/cart-items/{item_id}", ctx.base_url))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_trailing_slashes_are_trimmed() {
    let ctx = require_db!();

    let resp = ctx
        .client
        .get(format!("{}/products/", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(format!("{}/products", ctx.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
