use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Optional profile fields carried alongside an identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub occupation: Option<String>,
    pub company_name: Option<String>,
    pub profile_picture: Option<String>,
}

impl Profile {
    /// Overlay the fields present in `other`, keeping the current value otherwise.
    #[must_use]
    pub fn merged(self, other: Profile) -> Self {
        Self {
            first_name: other.first_name.or(self.first_name),
            last_name: other.last_name.or(self.last_name),
            occupation: other.occupation.or(self.occupation),
            company_name: other.company_name.or(self.company_name),
            profile_picture: other.profile_picture.or(self.profile_picture),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.occupation.is_none()
            && self.company_name.is_none()
            && self.profile_picture.is_none()
    }
}

/// A registered user's durable record.
#[derive(Clone, Debug)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub password_hash: SecretString,
    pub is_admin: bool,
    pub profile: Profile,
}

/// Data needed to register an identity. The password is already hashed.
#[derive(Clone, Debug)]
pub struct NewIdentity {
    pub email: String,
    pub password_hash: SecretString,
    pub is_admin: bool,
    pub profile: Profile,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct IdentityUpdate {
    pub email: Option<String>,
    pub password_hash: Option<SecretString>,
    pub profile: Profile,
}

impl IdentityUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none() && self.profile.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_keeps_unset_fields() {
        let current = Profile {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..Profile::default()
        };
        let patch = Profile {
            last_name: Some("King".to_string()),
            occupation: Some("Analyst".to_string()),
            ..Profile::default()
        };

        let merged = current.merged(patch);
        assert_eq!(merged.first_name.as_deref(), Some("Ada"));
        assert_eq!(merged.last_name.as_deref(), Some("King"));
        assert_eq!(merged.occupation.as_deref(), Some("Analyst"));
        assert!(merged.company_name.is_none());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(IdentityUpdate::default().is_empty());
        let update = IdentityUpdate {
            email: Some("a@example.com".to_string()),
            ..IdentityUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
