//! Authentication and authorization core.
//!
//! - [`CredentialVerifier`] checks an email/password pair against the store.
//! - [`TokenService`] issues and validates signed, expiring bearer tokens.
//! - [`policy::authorize`] decides ownership/admin access for decoded claims.
//! - [`AuthService`] composes them for login, signup, "who am I" and request gating.
//!
//! None of these hold mutable state. They are built once from [`AuthConfig`] and
//! shared behind an `Arc`.

pub mod config;
pub mod credentials;
pub mod error;
pub mod password;
pub mod policy;
pub mod service;
pub mod token;
mod utils;

pub use config::AuthConfig;
pub use credentials::CredentialVerifier;
pub use error::{AuthError, Result};
pub use password::{BcryptHasher, PasswordHasher};
pub use policy::{authorize, AccessDecision, DenyReason, Requirement};
pub use service::{AuthService, ProfileChanges, Registration};
pub use token::{Claims, TokenService};
