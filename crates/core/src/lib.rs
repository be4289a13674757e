//! Tradewind Core - Shared domain types.
//!
//! This crate provides the validated types used by the API crate:
//! type-safe entity IDs, email addresses, usernames, and phone numbers.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Validation happens at the edge: a value of one of these
//! types is well-formed by construction.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, usernames, and phone numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
