//! In-memory implementations of the federata storage ports.
//!
//! Intended for tests, examples and single-process deployments. Each store
//! honors the same contracts a persistent backend must provide; in
//! particular, link insertion enforces the `(provider, provider_id)`
//! uniqueness constraint so racing first-time logins surface as a
//! [`RepositoryError::Conflict`] the flow can converge on.

#![warn(missing_docs)]

use async_trait::async_trait;
use federata_core::{
    AuthError, LocalUser, NewUser, RepositoryError, Role, RoleRepository, SessionStorage,
    UserLink, UserLinkRepository, UserRepository,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory [`UserRepository`] with uuid-assigned ids.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, LocalUser>>,
}

impl MemoryUserRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<LocalUser>, RepositoryError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<LocalUser>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.as_deref() == Some(email))
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<LocalUser, RepositoryError> {
        let user = user.with_id(Uuid::new_v4().to_string());
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

/// In-memory [`UserLinkRepository`] enforcing the unique
/// `(provider, provider_id)` pair.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: RwLock<HashMap<(String, String), UserLink>>,
}

impl MemoryLinkRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserLinkRepository for MemoryLinkRepository {
    async fn find_by_provider_id(
        &self,
        provider_id: &str,
        provider: &str,
    ) -> Result<Option<UserLink>, RepositoryError> {
        let key = (provider.to_string(), provider_id.to_string());
        Ok(self.links.read().await.get(&key).cloned())
    }

    async fn insert(&self, link: &UserLink) -> Result<(), RepositoryError> {
        let key = (link.provider.clone(), link.provider_id.clone());
        let mut links = self.links.write().await;
        if links.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!(
                "link already exists for ({}, {})",
                link.provider, link.provider_id
            )));
        }
        links.insert(key, link.clone());
        Ok(())
    }
}

/// In-memory [`RoleRepository`], seeded at construction and immutable
/// afterwards.
#[derive(Default)]
pub struct MemoryRoleRepository {
    roles: HashMap<String, Role>,
}

impl MemoryRoleRepository {
    /// A repository with no roles defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository seeded with the given role ids.
    pub fn with_roles<I, S>(role_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = role_ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), Role::new(id))
            })
            .collect();
        Self { roles }
    }
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn find_by_role_id(&self, role_id: &str) -> Result<Option<Role>, RepositoryError> {
        Ok(self.roles.get(role_id).cloned())
    }
}

/// In-memory [`SessionStorage`].
#[derive(Default)]
pub struct MemorySessionStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn read(&self) -> Result<HashMap<String, String>, AuthError> {
        Ok(self.values.read().await.clone())
    }

    async fn write(&self, values: HashMap<String, String>) -> Result<(), AuthError> {
        *self.values.write().await = values;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use federata_core::IDENTITY_KEY;

    #[tokio::test]
    async fn user_inserts_assign_unique_ids() {
        let repo = MemoryUserRepository::new();
        let a = repo.insert(NewUser::default()).await.unwrap();
        let b = repo.insert(NewUser::default()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(repo.find_by_id(&a.id).await.unwrap().unwrap().id, a.id);
    }

    #[tokio::test]
    async fn users_are_found_by_email() {
        let repo = MemoryUserRepository::new();
        let user = repo
            .insert(NewUser {
                email: Some("a@b.com".into()),
                ..NewUser::default()
            })
            .await
            .unwrap();

        let found = repo.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(repo.find_by_email("x@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_link_insert_conflicts() {
        let repo = MemoryLinkRepository::new();
        let link = UserLink::new("user-1", "ext-1", "facebook");
        repo.insert(&link).await.unwrap();

        let racing = UserLink::new("user-2", "ext-1", "facebook");
        let err = repo.insert(&racing).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // the first writer's link survives
        let found = repo
            .find_by_provider_id("ext-1", "facebook")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, "user-1");
    }

    #[tokio::test]
    async fn same_external_id_under_another_provider_is_distinct() {
        let repo = MemoryLinkRepository::new();
        repo.insert(&UserLink::new("user-1", "ext-1", "facebook"))
            .await
            .unwrap();
        repo.insert(&UserLink::new("user-2", "ext-1", "google"))
            .await
            .unwrap();

        let google = repo
            .find_by_provider_id("ext-1", "google")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(google.user_id, "user-2");
    }

    #[tokio::test]
    async fn session_storage_round_trips_the_identity_key() {
        let storage = MemorySessionStorage::new();
        assert!(storage.read().await.unwrap().is_empty());

        let mut values = storage.read().await.unwrap();
        values.insert(IDENTITY_KEY.to_string(), "user-1".to_string());
        storage.write(values).await.unwrap();

        let read_back = storage.read().await.unwrap();
        assert_eq!(read_back.get(IDENTITY_KEY).map(String::as_str), Some("user-1"));
    }

    #[tokio::test]
    async fn seeded_roles_are_resolvable() {
        let repo = MemoryRoleRepository::with_roles(["user", "admin"]);
        assert!(repo.find_by_role_id("user").await.unwrap().is_some());
        assert!(repo.find_by_role_id("admin").await.unwrap().is_some());
        assert!(repo.find_by_role_id("root").await.unwrap().is_none());
    }
}
