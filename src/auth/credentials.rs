//! Email/password verification against stored hashes.

use secrecy::SecretString;
use std::sync::Arc;
use tracing::{instrument, warn};

use super::{
    error::{AuthError, Result},
    password::{verify_blocking, PasswordHasher},
    utils::normalize_email,
};
use crate::store::{Identity, UserStore};

// Compared against when the email is unknown so both failure paths do the same work.
const DUMMY_PASSWORD: &str = "codemart-dummy-password";

pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_hash: SecretString,
}

impl CredentialVerifier {
    /// # Errors
    /// Returns [`AuthError::Hashing`] if the placeholder hash cannot be computed.
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Result<Self> {
        let dummy_hash = SecretString::from(hasher.hash(DUMMY_PASSWORD)?);
        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }

    /// Check a login attempt and return the matching identity.
    ///
    /// Unknown emails and wrong passwords both yield
    /// [`AuthError::InvalidCredentials`].
    ///
    /// # Errors
    /// [`AuthError::InvalidInput`] for empty fields, [`AuthError::InvalidCredentials`]
    /// on mismatch, [`AuthError::Store`] if the lookup fails.
    #[instrument(skip_all)]
    pub async fn verify(&self, email: &str, password: &SecretString) -> Result<Identity> {
        use secrecy::ExposeSecret;

        let email = normalize_email(email);
        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::InvalidInput("email and password are required"));
        }

        let Some(identity) = self.store.find_by_email(&email).await? else {
            // Result is ignored; only the cost matters.
            let _ = verify_blocking(
                self.hasher.clone(),
                password.clone(),
                self.dummy_hash.clone(),
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        };

        match verify_blocking(
            self.hasher.clone(),
            password.clone(),
            identity.password_hash.clone(),
        )
        .await
        {
            Ok(true) => Ok(identity),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(err) => {
                warn!(user_id = identity.id, "stored password hash is unusable: {err}");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
