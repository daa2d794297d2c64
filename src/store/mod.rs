//! Persistence collaborator for identities.
//!
//! The auth core only reads and compares identities; it never owns them. All
//! access goes through [`UserStore`], implemented by [`PgUserStore`] for
//! Postgres and [`MemoryUserStore`] for tests and local runs.

mod memory;
mod model;
mod postgres;

pub use memory::MemoryUserStore;
pub use model::{Identity, IdentityUpdate, NewIdentity, Profile};
pub use postgres::PgUserStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name reported by `/health`.
    fn kind(&self) -> &'static str;

    /// Cheap liveness check for the backing store.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError>;

    /// Insert a new identity. Fails with [`StoreError::Duplicate`] when the email is taken.
    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    /// Apply the non-empty fields of `update`. Returns `None` if `id` does not exist.
    async fn update(&self, id: i64, update: IdentityUpdate) -> Result<Option<Identity>, StoreError>;

    /// Returns `false` if `id` does not exist.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}
