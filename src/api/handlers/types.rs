//! Request/response types for the HTTP surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{Identity, Profile};

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub occupation: Option<String>,
    pub company_name: Option<String>,
    pub profile_picture: Option<String>,
}

impl SignupRequest {
    pub(crate) fn profile(&self) -> Profile {
        Profile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            occupation: self.occupation.clone(),
            company_name: self.company_name.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// Allow-listed fields a user may change. `is_admin` is not one of them.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub occupation: Option<String>,
    pub company_name: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateUserRequest {
    pub(crate) fn profile(&self) -> Profile {
        Profile {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            occupation: self.occupation.clone(),
            company_name: self.company_name.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

/// Public view of an identity. Never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct IdentitySummary {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
    #[serde(flatten)]
    pub profile: Profile,
}

impl From<Identity> for IdentitySummary {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            is_admin: identity.is_admin,
            profile: identity.profile,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use secrecy::SecretString;

    #[test]
    fn login_request_tolerates_missing_fields() -> Result<()> {
        let request: LoginRequest = serde_json::from_str(r#"{"email":"a@example.com"}"#)?;
        assert_eq!(request.email, "a@example.com");
        assert!(request.password.is_empty());
        Ok(())
    }

    #[test]
    fn update_request_rejects_admin_flag() {
        let result = serde_json::from_str::<UpdateUserRequest>(r#"{"is_admin":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn summary_flattens_profile_and_hides_hash() -> Result<()> {
        let summary = IdentitySummary::from(Identity {
            id: 7,
            email: "ada@example.com".to_string(),
            password_hash: SecretString::from("$2b$04$secret"),
            is_admin: false,
            profile: Profile {
                first_name: Some("Ada".to_string()),
                ..Profile::default()
            },
        });

        let value = serde_json::to_value(&summary)?;
        let first_name = value
            .get("first_name")
            .and_then(serde_json::Value::as_str)
            .context("missing first_name")?;
        assert_eq!(first_name, "Ada");
        assert!(value.get("password_hash").is_none());
        assert!(!value.to_string().contains("secret"));
        Ok(())
    }
}
