//! Ownership-based access policy.
//!
//! Every protected operation names a [`Requirement`]. [`authorize`] checks the
//! caller's decoded [`Claims`] against it. A missing caller is always
//! `Unauthenticated`; a known caller without the privilege is `Forbidden`.

use std::fmt;

use super::{
    error::{AuthError, Result},
    token::Claims,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The caller owns the resource or is an administrator.
    SelfOrAdmin(i64),
    /// The caller owns the resource. Administrators get no override.
    SelfOnly(i64),
    /// The caller is an administrator.
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Forbidden => write!(f, "forbidden"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// # Errors
    /// Maps `Deny` to [`AuthError::Unauthenticated`] or [`AuthError::Forbidden`].
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Unauthenticated) => Err(AuthError::Unauthenticated),
            Self::Deny(DenyReason::Forbidden) => Err(AuthError::Forbidden),
        }
    }
}

#[must_use]
pub fn authorize(claims: Option<&Claims>, requirement: Requirement) -> AccessDecision {
    let Some(claims) = claims else {
        return AccessDecision::Deny(DenyReason::Unauthenticated);
    };

    let allowed = match requirement {
        Requirement::SelfOrAdmin(owner) => claims.subject_id == owner || claims.is_admin,
        Requirement::SelfOnly(owner) => claims.subject_id == owner,
        Requirement::AdminOnly => claims.is_admin,
    };

    if allowed {
        AccessDecision::Allow
    } else {
        AccessDecision::Deny(DenyReason::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(subject_id: i64, is_admin: bool) -> Claims {
        Claims {
            subject_id,
            is_admin,
            issued_at: 0,
            expires_at: 3600,
        }
    }

    #[test]
    fn self_or_admin_allows_owner() {
        let caller = claims(5, false);
        assert_eq!(
            authorize(Some(&caller), Requirement::SelfOrAdmin(5)),
            AccessDecision::Allow
        );
        assert_eq!(
            authorize(Some(&caller), Requirement::SelfOrAdmin(6)),
            AccessDecision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn admin_allows_any_target() {
        let admin = claims(1, true);
        for target in [1, 2, 6, i64::MAX] {
            assert!(authorize(Some(&admin), Requirement::SelfOrAdmin(target)).is_allowed());
        }
        assert!(authorize(Some(&admin), Requirement::AdminOnly).is_allowed());
    }

    #[test]
    fn admin_only_rejects_regular_users() {
        let user = claims(5, false);
        assert_eq!(
            authorize(Some(&user), Requirement::AdminOnly),
            AccessDecision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn self_only_has_no_admin_override() {
        assert!(authorize(Some(&claims(5, false)), Requirement::SelfOnly(5)).is_allowed());
        assert_eq!(
            authorize(Some(&claims(1, true)), Requirement::SelfOnly(5)),
            AccessDecision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn missing_claims_are_unauthenticated() {
        for requirement in [
            Requirement::SelfOrAdmin(5),
            Requirement::SelfOnly(5),
            Requirement::AdminOnly,
        ] {
            assert_eq!(
                authorize(None, requirement),
                AccessDecision::Deny(DenyReason::Unauthenticated)
            );
        }
    }

    #[test]
    fn decisions_map_to_distinct_errors() {
        assert!(AccessDecision::Allow.into_result().is_ok());
        assert!(matches!(
            AccessDecision::Deny(DenyReason::Unauthenticated).into_result(),
            Err(AuthError::Unauthenticated)
        ));
        assert!(matches!(
            AccessDecision::Deny(DenyReason::Forbidden).into_result(),
            Err(AuthError::Forbidden)
        ));
        assert_eq!(DenyReason::Forbidden.to_string(), "forbidden");
    }
}
