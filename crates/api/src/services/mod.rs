//! Business services.
//!
//! - [`auth`] - Registration, login, tokens, and the password lifecycle
//! - [`access`] - The per-action permission table for the user resource

pub mod access;
pub mod auth;
