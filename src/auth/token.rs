//! Signed, stateless identity tokens (HS256 JWT).
//!
//! Tokens carry the subject id, the admin flag, `iat` and `exp`, plus `iss` and
//! `aud` when those are configured. A token is valid iff its signature verifies
//! under the configured key, `exp` is strictly in the future, and the configured
//! issuer/audience match. There is no leeway and no revocation list.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    config::AuthConfig,
    error::{AuthError, Result},
    utils::now_unix_seconds,
};
use crate::store::Identity;

/// Wire format of the token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenClaims {
    sub: String,
    is_admin: bool,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
}

/// Decoded identity carried by a valid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub subject_id: i64,
    pub is_admin: bool,
    pub issued_at: i64,
    pub expires_at: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the signing key is empty or the TTL
    /// is not positive.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let secret = config.signing_key().expose_secret();
        if secret.trim().is_empty() {
            return Err(AuthError::Configuration(
                "token signing key is not configured".to_string(),
            ));
        }
        if config.token_ttl_minutes() <= 0 {
            return Err(AuthError::Configuration(format!(
                "token TTL must be positive, got {} minutes",
                config.token_ttl_minutes()
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: config.issuer().map(str::to_string),
            audience: config.audience().map(str::to_string),
            ttl_seconds: config.token_ttl_minutes().saturating_mul(60),
        })
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `identity`, valid from now for the configured TTL.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        self.issue_at(identity, now_unix_seconds())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if signing fails.
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<String> {
        let claims = TokenClaims {
            sub: identity.id.to_string(),
            is_admin: identity.is_admin,
            iat: now,
            exp: now.saturating_add(self.ttl_seconds),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Configuration(format!("failed to sign token: {e}")))
    }

    /// Validate `token` against the current time.
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`], [`AuthError::ExpiredToken`] or
    /// [`AuthError::ClaimMismatch`].
    pub fn decode(&self, token: &str) -> Result<Claims> {
        self.decode_at(token, now_unix_seconds())
    }

    /// Validate `token` as if the current time were `now` (Unix seconds).
    ///
    /// # Errors
    /// [`AuthError::InvalidToken`], [`AuthError::ExpiredToken`] or
    /// [`AuthError::ClaimMismatch`].
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims> {
        let data = decode::<TokenClaims>(token.trim(), &self.decoding_key, &self.validation())
            .map_err(|err| {
                debug!("token rejected: {err}");
                map_decode_error(err.kind())
            })?;
        let claims = data.claims;

        if claims.exp <= now {
            return Err(AuthError::ExpiredToken);
        }

        let subject_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(Claims {
            subject_id,
            is_admin: claims.is_admin,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied clock in `decode_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        // A configured issuer or audience must be present, not only match.
        let mut required = vec!["exp", "sub"];
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match &self.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);
        validation
    }
}

fn map_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        ErrorKind::InvalidIssuer => AuthError::ClaimMismatch("issuer"),
        ErrorKind::InvalidAudience => AuthError::ClaimMismatch("audience"),
        ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => {
            AuthError::ClaimMismatch("issuer")
        }
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => {
            AuthError::ClaimMismatch("audience")
        }
        _ => AuthError::InvalidToken,
    }
}
