//! Domain models.
//!
//! These types represent validated rows separate from request/response
//! payloads. All of them serialize to the wire shapes the API exposes.

pub mod cart;
pub mod catalog;
pub mod user;

pub use cart::{Cart, CartItem, CartItemChanges};
pub use catalog::{NewProduct, Product, ProductChanges, ProductType};
pub use user::{AuthUser, NewUser, User, UserChanges};
