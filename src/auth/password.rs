//! Password hashing capability.
//!
//! The auth core never compares passwords directly; it goes through
//! [`PasswordHasher`], which wraps a salted, adaptive hash. [`BcryptHasher`] is
//! the production implementation. Hashing is CPU bound, so callers in async
//! code use [`hash_blocking`] and [`verify_blocking`].

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use super::error::{AuthError, Result};

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    ///
    /// # Errors
    /// Returns [`AuthError::Hashing`] if the primitive fails.
    fn hash(&self, password: &str) -> Result<String>;

    /// Check `password` against a stored hash.
    ///
    /// # Errors
    /// Returns [`AuthError::Hashing`] if `hash` is not a valid hash string.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

#[derive(Clone, Copy, Debug)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// # Errors
    /// Returns [`AuthError::Configuration`] if `cost` is outside 4..=31.
    pub fn new(cost: u32) -> Result<Self> {
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(AuthError::Configuration(format!(
                "bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {cost}"
            )));
        }
        Ok(Self { cost })
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
    }
}

/// Hash on the blocking pool.
pub(crate) async fn hash_blocking(
    hasher: Arc<dyn PasswordHasher>,
    password: SecretString,
) -> Result<SecretString> {
    tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map(SecretString::from)
}

/// Verify on the blocking pool.
pub(crate) async fn verify_blocking(
    hasher: Arc<dyn PasswordHasher>,
    password: SecretString,
    hash: SecretString,
) -> Result<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), hash.expose_secret()))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn rejects_out_of_range_cost() {
        assert!(matches!(
            BcryptHasher::new(3),
            Err(AuthError::Configuration(_))
        ));
        assert!(matches!(
            BcryptHasher::new(32),
            Err(AuthError::Configuration(_))
        ));
        assert!(BcryptHasher::new(4).is_ok());
    }

    #[test]
    fn hash_is_salted_and_verifies() -> Result<()> {
        let hasher = BcryptHasher::new(4)?;
        let first = hasher.hash("hunter2")?;
        let second = hasher.hash("hunter2")?;

        assert_ne!(first, "hunter2");
        assert_ne!(first, second);
        assert!(hasher.verify("hunter2", &first)?);
        assert!(hasher.verify("hunter2", &second)?);
        assert!(!hasher.verify("hunter3", &first)?);
        Ok(())
    }

    #[test]
    fn malformed_hash_is_an_error() -> Result<()> {
        let hasher = BcryptHasher::new(4)?;
        assert!(matches!(
            hasher.verify("hunter2", "not-a-bcrypt-hash"),
            Err(AuthError::Hashing(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn blocking_helpers_round_trip() -> Result<()> {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(4)?);
        let hash = hash_blocking(hasher.clone(), SecretString::from("hunter2")).await?;
        assert!(verify_blocking(hasher.clone(), SecretString::from("hunter2"), hash.clone()).await?);
        assert!(!verify_blocking(hasher, SecretString::from("nope"), hash).await?);
        Ok(())
    }
}
