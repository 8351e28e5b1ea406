use crate::error::RepositoryError;
use crate::user::{LocalUser, NewUser, Role, UserLink};
use async_trait::async_trait;

/// Lookup and persistence for provider-to-user links.
#[async_trait]
pub trait UserLinkRepository: Send + Sync {
    /// Find the link for an external identifier under the given provider.
    async fn find_by_provider_id(
        &self,
        provider_id: &str,
        provider: &str,
    ) -> Result<Option<UserLink>, RepositoryError>;

    /// Persist a new link.
    ///
    /// Implementations must enforce uniqueness of `(provider, provider_id)`
    /// and report a duplicate as [`RepositoryError::Conflict`], so that
    /// racing first-time logins for the same external identity can converge
    /// on the winner's account.
    async fn insert(&self, link: &UserLink) -> Result<(), RepositoryError>;
}

/// Lookup and persistence for local user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<LocalUser>, RepositoryError>;

    /// Find a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<LocalUser>, RepositoryError>;

    /// Persist a new user and return it with its assigned id.
    async fn insert(&self, user: NewUser) -> Result<LocalUser, RepositoryError>;
}

/// Lookup for role definitions.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find a role by its application-defined identifier.
    async fn find_by_role_id(&self, role_id: &str) -> Result<Option<Role>, RepositoryError>;
}
