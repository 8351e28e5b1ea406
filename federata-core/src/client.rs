use crate::error::TransportError;
use crate::profile::ProviderProfile;
use async_trait::async_trait;

/// A connected session handle returned by a provider handshake.
pub trait ProviderSession: Send + Sync {
    /// Whether the external user is currently connected.
    fn is_user_connected(&self) -> bool;

    /// The normalized profile for the connected user, when available.
    fn user_profile(&self) -> Option<ProviderProfile>;
}

/// Port wrapping a concrete identity provider client library.
///
/// Implementations own the wire protocol (OAuth, OpenID, ...); the flow
/// only sees handshake results and classified transport faults.
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Run the handshake for the named provider and return a session handle.
    async fn authenticate(
        &self,
        provider: &str,
    ) -> Result<Box<dyn ProviderSession>, TransportError>;

    /// Force-logout any stored session for the named provider.
    async fn logout(&self, provider: &str) -> Result<(), TransportError>;
}
