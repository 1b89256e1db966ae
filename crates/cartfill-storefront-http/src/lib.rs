//! Live storefront adapter over the storefront's JSON API.
//!
//! `HttpStorefront` implements all four storefront ports. The session token
//! travels as a Bearer header and is persisted through [`SessionStore`] so
//! later runs can skip the login request.
//!
//! Credentials and tokens are never logged.

mod client;
mod session_store;
mod wire;

pub use client::{HttpStorefront, WRONG_PASSWORD_MARKER};
pub use session_store::{SessionStore, StoredSession};
