use federata_core::UserState;
use serde::{Deserialize, Serialize};

/// Configuration surface consumed by the flow.
///
/// Read-only to the coordinator; hosts typically deserialize this from
/// their application configuration and hand it in at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowOptions {
    /// Providers callers may authenticate against.
    pub enabled_providers: Vec<String>,
    /// Auto-create a local account on first social login.
    pub create_user_auto_social: bool,
    /// Role attached to every auto-created user.
    pub default_register_role: String,
    /// Gate logins on the account state.
    pub enable_user_state: bool,
    /// State assigned to auto-created users when gating is on.
    pub default_user_state: Option<UserState>,
    /// States permitted to log in when gating is on.
    pub allowed_login_states: Vec<UserState>,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            enabled_providers: Vec::new(),
            create_user_auto_social: true,
            default_register_role: "user".to_string(),
            enable_user_state: false,
            default_user_state: Some(UserState::Active),
            allowed_login_states: vec![UserState::Active],
        }
    }
}

impl FlowOptions {
    /// Whether the named provider is non-empty and on the allow-list.
    pub fn provider_enabled(&self, provider: &str) -> bool {
        !provider.is_empty() && self.enabled_providers.iter().any(|p| p == provider)
    }

    /// Whether an account in the given state may log in.
    pub fn login_permitted(&self, state: UserState) -> bool {
        self.allowed_login_states.contains(&state)
    }
}
