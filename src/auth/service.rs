//! Login, signup and per-request gating over the auth components.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    config::AuthConfig,
    credentials::CredentialVerifier,
    error::{AuthError, Result},
    password::{hash_blocking, BcryptHasher, PasswordHasher},
    policy::{self, AccessDecision, Requirement},
    token::{Claims, TokenService},
    utils::{normalize_email, valid_email},
};
use crate::store::{Identity, IdentityUpdate, NewIdentity, Profile, StoreError, UserStore};

/// Signup payload. The password is plaintext until hashed here.
#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub password: SecretString,
    pub profile: Profile,
}

/// Partial update of an existing identity.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub profile: Profile,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    credentials: CredentialVerifier,
    tokens: TokenService,
}

impl AuthService {
    /// Build the service with a bcrypt hasher at the configured cost.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] for an empty signing key, a
    /// non-positive TTL or an out of range bcrypt cost.
    pub fn new(config: &AuthConfig, store: Arc<dyn UserStore>) -> Result<Self> {
        let hasher = Arc::new(BcryptHasher::new(config.bcrypt_cost())?);
        Self::with_hasher(config, store, hasher)
    }

    /// # Errors
    /// Returns [`AuthError::Configuration`] if the token service cannot be built.
    pub fn with_hasher(
        config: &AuthConfig,
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self> {
        let tokens = TokenService::new(config)?;
        let credentials = CredentialVerifier::new(store.clone(), hasher.clone())?;
        Ok(Self {
            store,
            hasher,
            credentials,
            tokens,
        })
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    /// [`AuthError::InvalidInput`] for missing fields, [`AuthError::InvalidCredentials`]
    /// for any mismatch, [`AuthError::Store`] if the lookup fails.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<String> {
        let identity = match self.credentials.verify(email, password).await {
            Ok(identity) => identity,
            Err(err @ (AuthError::InvalidInput(_) | AuthError::Store(_))) => return Err(err),
            Err(err) => {
                debug!("login rejected: {err}");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&identity)?;
        info!(user_id = identity.id, "login succeeded");
        Ok(token)
    }

    /// Register a regular (non-admin) identity and issue its first token.
    ///
    /// # Errors
    /// [`AuthError::InvalidInput`] for an empty or malformed email or empty
    /// password, [`AuthError::Creation`] if the store rejects the identity.
    #[instrument(skip_all)]
    pub async fn signup(&self, registration: Registration) -> Result<String> {
        let email = checked_email(&registration.email)?;
        if registration.password.expose_secret().is_empty() {
            return Err(AuthError::InvalidInput("password is required"));
        }

        let password_hash = hash_blocking(self.hasher.clone(), registration.password).await?;
        let identity = self
            .store
            .create(NewIdentity {
                email,
                password_hash,
                is_admin: false,
                profile: registration.profile,
            })
            .await
            .map_err(|err| {
                if matches!(err, StoreError::Duplicate) {
                    warn!("signup rejected: email already registered");
                }
                AuthError::Creation(err.to_string())
            })?;

        let token = self.tokens.issue(&identity)?;
        info!(user_id = identity.id, "signup succeeded");
        Ok(token)
    }

    /// Resolve the identity behind a token.
    ///
    /// # Errors
    /// Token rejections as in [`TokenService::decode`], [`AuthError::NotFound`]
    /// if the subject no longer exists.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &str) -> Result<Identity> {
        let claims = self.tokens.decode(token)?;
        self.store
            .find_by_id(claims.subject_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Decode the bearer token of a request, if any.
    ///
    /// # Errors
    /// [`AuthError::Unauthenticated`] when no token was presented; decode
    /// failures keep their own variant.
    pub fn authenticate(&self, bearer: Option<&str>) -> Result<Claims> {
        let token = bearer
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        self.tokens.decode(token).inspect_err(|err| {
            debug!("bearer token rejected: {err}");
        })
    }

    #[must_use]
    pub fn authorize(&self, claims: Option<&Claims>, requirement: Requirement) -> AccessDecision {
        policy::authorize(claims, requirement)
    }

    /// Authenticate the request and check `requirement` in one step.
    ///
    /// # Errors
    /// [`AuthError::Unauthenticated`] or a token rejection for a missing or bad
    /// token, [`AuthError::Forbidden`] when the caller lacks the privilege.
    pub fn gate(&self, bearer: Option<&str>, requirement: Requirement) -> Result<Claims> {
        let claims = self.authenticate(bearer)?;
        self.authorize(Some(&claims), requirement)
            .into_result()
            .inspect_err(|_| {
                debug!(
                    user_id = claims.subject_id,
                    ?requirement,
                    "access denied"
                );
            })?;
        Ok(claims)
    }

    /// Apply `changes` to identity `id`. A new password is hashed before storing.
    ///
    /// # Errors
    /// [`AuthError::InvalidInput`] when nothing would change or the new email is
    /// malformed, [`AuthError::NotFound`] if `id` does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update_user(&self, id: i64, changes: ProfileChanges) -> Result<Identity> {
        let email = changes.email.as_deref().map(checked_email).transpose()?;

        let password_hash = match changes.password {
            Some(password) if password.expose_secret().is_empty() => {
                return Err(AuthError::InvalidInput("password must not be empty"));
            }
            Some(password) => Some(hash_blocking(self.hasher.clone(), password).await?),
            None => None,
        };

        let update = IdentityUpdate {
            email,
            password_hash,
            profile: changes.profile,
        };
        if update.is_empty() {
            return Err(AuthError::InvalidInput("no changes supplied"));
        }

        let identity = self
            .store
            .update(id, update)
            .await?
            .ok_or(AuthError::NotFound)?;
        info!(user_id = id, "user updated");
        Ok(identity)
    }

    /// # Errors
    /// [`AuthError::NotFound`] if `id` does not exist.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(AuthError::NotFound);
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }
}

fn checked_email(raw: &str) -> Result<String> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(AuthError::InvalidInput("email is required"));
    }
    if !valid_email(&email) {
        return Err(AuthError::InvalidInput("email is malformed"));
    }
    Ok(email)
}
