//! Read-only auth configuration, built once at boot.

use secrecy::SecretString;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    signing_key: SecretString,
    issuer: Option<String>,
    audience: Option<String>,
    token_ttl_minutes: i64,
    bcrypt_cost: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(signing_key: SecretString) -> Self {
        Self {
            signing_key,
            issuer: None,
            audience: None,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer.filter(|value| !value.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience.filter(|value| !value.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_token_ttl_minutes(mut self, minutes: i64) -> Self {
        self.token_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub(crate) fn signing_key(&self) -> &SecretString {
        &self.signing_key
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    #[must_use]
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    #[must_use]
    pub fn token_ttl_minutes(&self) -> i64 {
        self.token_ttl_minutes
    }

    #[must_use]
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults() {
        let config = AuthConfig::new(SecretString::from("secret"));
        assert_eq!(config.signing_key().expose_secret(), "secret");
        assert_eq!(config.token_ttl_minutes(), 60);
        assert_eq!(config.bcrypt_cost(), 12);
        assert!(config.issuer().is_none());
        assert!(config.audience().is_none());
    }

    #[test]
    fn blank_issuer_and_audience_are_unset() {
        let config = AuthConfig::new(SecretString::from("secret"))
            .with_issuer(Some("  ".to_string()))
            .with_audience(Some(String::new()));
        assert!(config.issuer().is_none());
        assert!(config.audience().is_none());

        let config = AuthConfig::new(SecretString::from("secret"))
            .with_issuer(Some("https://api.codemart.dev".to_string()))
            .with_audience(Some("codemart".to_string()));
        assert_eq!(config.issuer(), Some("https://api.codemart.dev"));
        assert_eq!(config.audience(), Some("codemart"));
    }
}
