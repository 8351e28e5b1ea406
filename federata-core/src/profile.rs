use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A normalized profile returned by an identity provider.
///
/// One `ProviderProfile` is produced per authentication attempt and never
/// mutated afterwards. The `identifier` is opaque and only meaningful within
/// the provider that issued it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Provider-scoped opaque identifier for the external account.
    pub identifier: String,
    /// Display name, when the provider exposes one.
    pub display_name: Option<String>,
    /// First name, when the provider exposes one.
    pub first_name: Option<String>,
    /// Primary email, verified or not.
    pub email: Option<String>,
    /// Email address the provider asserts as verified. Non-empty means the
    /// provider vouches for it.
    pub email_verified: Option<String>,
    /// Unnormalized provider fields, kept for extension hooks.
    pub attributes: HashMap<String, String>,
}

impl ProviderProfile {
    /// Create a profile carrying only the external identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// The verified email, if the provider asserted a non-empty one.
    pub fn verified_email(&self) -> Option<&str> {
        self.email_verified.as_deref().filter(|e| !e.is_empty())
    }
}
