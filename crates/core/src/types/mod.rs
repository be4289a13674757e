//! Core type definitions.

pub mod email;
pub mod id;
pub mod phone;
pub mod username;

pub use email::{Email, EmailError};
pub use id::{CartId, CartItemId, ProductId, ProductTypeId, UserId};
pub use phone::{PhoneNumber, PhoneNumberError};
pub use username::{Username, UsernameError};
