use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a local account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    /// The account may log in.
    #[default]
    Active,
    /// The account awaits confirmation.
    Pending,
    /// The account has been disabled.
    Disabled,
}

/// A role attachable to local users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Application-defined role identifier.
    pub role_id: String,
}

impl Role {
    /// Create a role with the given identifier.
    pub fn new(role_id: impl Into<String>) -> Self {
        Self {
            role_id: role_id.into(),
        }
    }
}

/// A local user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalUser {
    /// Repository-assigned identifier.
    pub id: String,
    /// Display name shown to other users.
    pub display_name: Option<String>,
    /// Login name, when one exists.
    pub username: Option<String>,
    /// Email address, when one is known.
    pub email: Option<String>,
    /// Placeholder credential for accounts created via a provider; these
    /// accounts have no local password.
    pub password_placeholder: String,
    /// Current lifecycle state.
    pub state: UserState,
    /// Roles attached to the account.
    pub roles: Vec<Role>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A local user before the repository has assigned it an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    /// Display name shown to other users.
    pub display_name: Option<String>,
    /// Login name, when one exists.
    pub username: Option<String>,
    /// Email address, when one is known.
    pub email: Option<String>,
    /// Placeholder credential, typically derived from the provider name.
    pub password_placeholder: String,
    /// Initial lifecycle state.
    pub state: UserState,
    /// Roles attached at creation time.
    pub roles: Vec<Role>,
}

impl NewUser {
    /// Finalize with a repository-assigned id, stamping the creation time.
    pub fn with_id(self, id: impl Into<String>) -> LocalUser {
        LocalUser {
            id: id.into(),
            display_name: self.display_name,
            username: self.username,
            email: self.email,
            password_placeholder: self.password_placeholder,
            state: self.state,
            roles: self.roles,
            created_at: Utc::now(),
        }
    }
}

/// The persisted association between an external provider identity and a
/// local account.
///
/// `(provider, provider_id)` is unique; a link is created once during the
/// first successful social login for that provider and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLink {
    /// Id of the linked local user.
    pub user_id: String,
    /// External identifier within the provider.
    pub provider_id: String,
    /// Provider name.
    pub provider: String,
}

impl UserLink {
    /// Create a link binding a local user to an external identity.
    pub fn new(
        user_id: impl Into<String>,
        provider_id: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            provider_id: provider_id.into(),
            provider: provider.into(),
        }
    }
}
