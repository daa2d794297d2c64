//! API handlers.
//!
//! Handlers stay thin: extract the bearer token and body, call [`AuthService`],
//! and let [`AuthError`] pick the status code.
//!
//! [`AuthService`]: crate::auth::AuthService
//! [`AuthError`]: crate::auth::AuthError

pub mod auth;
pub mod health;
pub mod principal;
pub mod types;
pub mod users;
