//! Process-local identity store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{Identity, IdentityUpdate, NewIdentity, StoreError, UserStore};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, Identity>,
}

/// In-memory [`UserStore`]. Ids are assigned sequentially starting at 1.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    state: RwLock<State>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == identity.email) {
            return Err(StoreError::Duplicate);
        }

        state.last_id += 1;
        let created = Identity {
            id: state.last_id,
            email: identity.email,
            password_hash: identity.password_hash,
            is_admin: identity.is_admin,
            profile: identity.profile,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, update: IdentityUpdate) -> Result<Option<Identity>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(email) = &update.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Duplicate);
            }
        }

        let Some(current) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(email) = update.email {
            current.email = email;
        }
        if let Some(hash) = update.password_hash {
            current.password_hash = hash;
        }
        current.profile = std::mem::take(&mut current.profile).merged(update.profile);

        Ok(Some(current.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.state.write().await.users.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Profile;
    use anyhow::{Context, Result};
    use secrecy::{ExposeSecret, SecretString};

    fn new_identity(email: &str) -> NewIdentity {
        NewIdentity {
            email: email.to_string(),
            password_hash: SecretString::from("$2b$04$hash"),
            is_admin: false,
            profile: Profile::default(),
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() -> Result<()> {
        let store = MemoryUserStore::new();
        let first = store.create(new_identity("a@example.com")).await?;
        let second = store.create(new_identity("b@example.com")).await?;
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() -> Result<()> {
        let store = MemoryUserStore::new();
        store.create(new_identity("a@example.com")).await?;
        let result = store.create(new_identity("a@example.com")).await;
        assert!(matches!(result, Err(StoreError::Duplicate)));
        Ok(())
    }

    #[tokio::test]
    async fn find_by_email_and_id() -> Result<()> {
        let store = MemoryUserStore::new();
        let created = store.create(new_identity("a@example.com")).await?;

        let by_email = store
            .find_by_email("a@example.com")
            .await?
            .context("missing by email")?;
        assert_eq!(by_email.id, created.id);

        let by_id = store.find_by_id(created.id).await?.context("missing by id")?;
        assert_eq!(by_id.email, "a@example.com");

        assert!(store.find_by_email("nobody@example.com").await?.is_none());
        assert!(store.find_by_id(99).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn update_applies_present_fields() -> Result<()> {
        let store = MemoryUserStore::new();
        let created = store.create(new_identity("a@example.com")).await?;

        let update = IdentityUpdate {
            password_hash: Some(SecretString::from("$2b$04$other")),
            profile: Profile {
                company_name: Some("Acme".to_string()),
                ..Profile::default()
            },
            ..IdentityUpdate::default()
        };
        let updated = store
            .update(created.id, update)
            .await?
            .context("missing updated user")?;

        assert_eq!(updated.email, "a@example.com");
        assert_eq!(updated.password_hash.expose_secret(), "$2b$04$other");
        assert_eq!(updated.profile.company_name.as_deref(), Some("Acme"));
        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_taken_email() -> Result<()> {
        let store = MemoryUserStore::new();
        store.create(new_identity("a@example.com")).await?;
        let second = store.create(new_identity("b@example.com")).await?;

        let update = IdentityUpdate {
            email: Some("a@example.com".to_string()),
            ..IdentityUpdate::default()
        };
        let result = store.update(second.id, update).await;
        assert!(matches!(result, Err(StoreError::Duplicate)));
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_missing_user() -> Result<()> {
        let store = MemoryUserStore::new();
        assert!(store.update(7, IdentityUpdate::default()).await?.is_none());
        assert!(!store.delete(7).await?);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_user() -> Result<()> {
        let store = MemoryUserStore::new();
        let created = store.create(new_identity("a@example.com")).await?;
        assert!(store.delete(created.id).await?);
        assert!(store.is_empty().await);
        Ok(())
    }
}
