//! # CodeMart (marketplace authentication and authorization)
//!
//! `codemart` owns the trust decisions of the marketplace API: who a caller is
//! and whether they may act on a given resource.
//!
//! ## Authentication
//!
//! Users log in with email and password. Passwords are stored as bcrypt hashes
//! and never compared in plaintext. A successful login or signup returns an
//! HS256 JWT carrying the user id and the admin flag. Tokens are stateless and
//! stop working only when they expire (60 minutes by default).
//!
//! Login failures never reveal whether the email is registered.
//!
//! ## Authorization
//!
//! Protected routes declare a [`auth::Requirement`]:
//!
//! - `SelfOrAdmin(id)`: the caller owns `id` or is an administrator.
//! - `SelfOnly(id)`: the caller owns `id`.
//! - `AdminOnly`: the caller is an administrator.
//!
//! A missing or invalid token is `401 Unauthorized`; a valid token without the
//! privilege is `403 Forbidden`.
//!
//! ## Persistence
//!
//! Identities live behind [`store::UserStore`]: Postgres in production, an
//! in-memory store for tests and local runs without a DSN.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
