use crate::options::FlowOptions;
use async_trait::async_trait;
use federata_core::{
    AuthError, AuthEvent, EventSink, LocalUser, NewUser, OutcomeCode, ProviderProfile,
    RepositoryError, RoleRepository, UserRepository,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared registration services handed to every mapper.
///
/// [`register`](Registrar::register) is the single choke point through which
/// every auto-created social user is persisted: the default state, the
/// default register role and the registration lifecycle events all happen
/// here, with no code path around it.
pub struct Registrar {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    events: Arc<dyn EventSink>,
    options: FlowOptions,
}

impl Registrar {
    /// Build a registrar over the given repositories, sink and options.
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        events: Arc<dyn EventSink>,
        options: FlowOptions,
    ) -> Self {
        Self {
            users,
            roles,
            events,
            options,
        }
    }

    /// Look up an existing account by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<LocalUser>, AuthError> {
        Ok(self.users.find_by_email(email).await?)
    }

    /// The event sink, for mappers that expose enrichment hooks.
    pub fn events(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Persist an auto-created user.
    ///
    /// Applies the configured default state (when state gating is on),
    /// attaches the default register role, and wraps the insert in the
    /// `RegisterViaProvider` pre/post notifications.
    pub async fn register(
        &self,
        mut user: NewUser,
        provider: &str,
        profile: &ProviderProfile,
    ) -> Result<LocalUser, AuthError> {
        if self.options.enable_user_state {
            if let Some(state) = self.options.default_user_state {
                user.state = state;
            }
        }

        let role_id = &self.options.default_register_role;
        let role = self
            .roles
            .find_by_role_id(role_id)
            .await?
            .ok_or_else(|| {
                AuthError::Repository(RepositoryError::Storage(format!(
                    "default register role {role_id:?} is not defined"
                )))
            })?;
        user.roles.push(role);

        self.events.notify(&AuthEvent::RegisterViaProvider {
            user: &user,
            provider,
            profile,
        });
        let created = self.users.insert(user).await?;
        self.events.notify(&AuthEvent::RegisterViaProviderPost {
            user: &created,
            provider,
            profile,
        });
        log::debug!("registered local user {} via {provider}", created.id);

        Ok(created)
    }
}

/// Per-provider policy converting an external profile into a local user.
///
/// A mapper either resolves an existing account or constructs a new one and
/// funnels it through [`Registrar::register`]. Validation failures are
/// returned as [`AuthError::Validation`] and surfaced verbatim to the
/// caller.
#[async_trait]
pub trait ProfileMapper: Send + Sync {
    /// Obtain or create the local user for this profile.
    async fn map_profile(
        &self,
        provider: &str,
        profile: &ProviderProfile,
        registrar: &Registrar,
    ) -> Result<LocalUser, AuthError>;
}

fn unverified_email_error(label: &str) -> AuthError {
    AuthError::validation(
        OutcomeCode::CredentialInvalid,
        format!("Please verify your email with {label} before attempting login"),
    )
}

/// Mapper for providers that must assert a verified email (facebook, google,
/// foursquare).
///
/// When an account with the verified email already exists it is reused
/// instead of creating a duplicate; the link is then bound to it by the
/// coordinator.
pub struct EmailVerifiedMapper {
    label: String,
}

impl EmailVerifiedMapper {
    /// Create a mapper using `label` as the provider name in user-facing
    /// validation messages.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl ProfileMapper for EmailVerifiedMapper {
    async fn map_profile(
        &self,
        provider: &str,
        profile: &ProviderProfile,
        registrar: &Registrar,
    ) -> Result<LocalUser, AuthError> {
        let email = profile
            .verified_email()
            .ok_or_else(|| unverified_email_error(&self.label))?;

        if let Some(existing) = registrar.find_by_email(email).await? {
            return Ok(existing);
        }

        let user = NewUser {
            email: Some(email.to_string()),
            display_name: profile.display_name.clone(),
            password_placeholder: provider.to_string(),
            ..NewUser::default()
        };
        registrar.register(user, provider, profile).await
    }
}

/// GitHub mapper: email-requiring, and emits the provider-specific
/// [`AuthEvent::ProviderMapping`] hook before registering so hosts can
/// observe the mapping.
pub struct GithubMapper;

#[async_trait]
impl ProfileMapper for GithubMapper {
    async fn map_profile(
        &self,
        provider: &str,
        profile: &ProviderProfile,
        registrar: &Registrar,
    ) -> Result<LocalUser, AuthError> {
        let email = profile
            .verified_email()
            .ok_or_else(|| unverified_email_error("GitHub"))?;

        if let Some(existing) = registrar.find_by_email(email).await? {
            return Ok(existing);
        }

        let user = NewUser {
            email: Some(email.to_string()),
            display_name: profile.display_name.clone(),
            password_placeholder: provider.to_string(),
            ..NewUser::default()
        };
        registrar.events().notify(&AuthEvent::ProviderMapping {
            provider,
            user: &user,
            profile,
        });
        registrar.register(user, provider, profile).await
    }
}

/// Twitter exposes the handle as the display name; it is stored as the
/// username, with the first name taking over as display name.
pub struct TwitterMapper;

#[async_trait]
impl ProfileMapper for TwitterMapper {
    async fn map_profile(
        &self,
        provider: &str,
        profile: &ProviderProfile,
        registrar: &Registrar,
    ) -> Result<LocalUser, AuthError> {
        let user = NewUser {
            username: profile.display_name.clone(),
            display_name: profile.first_name.clone(),
            password_placeholder: provider.to_string(),
            ..NewUser::default()
        };
        registrar.register(user, provider, profile).await
    }
}

/// Mapper for providers with no email precondition (linkedin, yahoo): the
/// account is constructed from the display name alone.
pub struct DisplayNameMapper;

#[async_trait]
impl ProfileMapper for DisplayNameMapper {
    async fn map_profile(
        &self,
        provider: &str,
        profile: &ProviderProfile,
        registrar: &Registrar,
    ) -> Result<LocalUser, AuthError> {
        let user = NewUser {
            display_name: profile.display_name.clone(),
            password_placeholder: provider.to_string(),
            ..NewUser::default()
        };
        registrar.register(user, provider, profile).await
    }
}

/// Default policy when no provider-specific mapper is registered: display
/// name plus a provider-derived placeholder password, and the email when
/// the provider asserts a verified one.
pub struct FallbackMapper;

#[async_trait]
impl ProfileMapper for FallbackMapper {
    async fn map_profile(
        &self,
        provider: &str,
        profile: &ProviderProfile,
        registrar: &Registrar,
    ) -> Result<LocalUser, AuthError> {
        let user = NewUser {
            display_name: profile.display_name.clone(),
            email: profile.verified_email().map(str::to_string),
            password_placeholder: provider.to_string(),
            ..NewUser::default()
        };
        registrar.register(user, provider, profile).await
    }
}

/// Registry mapping provider names to their mapper policies.
///
/// Lookups fall back to a generic mapper for providers with no specialized
/// policy, so dispatch is always explicit and total.
pub struct MapperRegistry {
    mappers: HashMap<String, Arc<dyn ProfileMapper>>,
    fallback: Arc<dyn ProfileMapper>,
}

impl MapperRegistry {
    /// An empty registry with only the generic fallback.
    pub fn new() -> Self {
        Self {
            mappers: HashMap::new(),
            fallback: Arc::new(FallbackMapper),
        }
    }

    /// Registry preloaded with the stock provider policies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert("facebook", EmailVerifiedMapper::new("Facebook"));
        registry.insert("google", EmailVerifiedMapper::new("Google"));
        registry.insert("foursquare", EmailVerifiedMapper::new("Foursquare"));
        registry.insert("github", GithubMapper);
        registry.insert("twitter", TwitterMapper);
        registry.insert("linkedin", DisplayNameMapper);
        registry.insert("yahoo", DisplayNameMapper);
        registry
    }

    /// Register or replace the mapper for a provider.
    pub fn insert(&mut self, provider: impl Into<String>, mapper: impl ProfileMapper + 'static) {
        self.mappers.insert(provider.into(), Arc::new(mapper));
    }

    /// Replace the fallback mapper.
    pub fn set_fallback(&mut self, mapper: impl ProfileMapper + 'static) {
        self.fallback = Arc::new(mapper);
    }

    /// The mapper for a provider, or the fallback when none is registered.
    pub fn get(&self, provider: &str) -> &dyn ProfileMapper {
        self.mappers
            .get(provider)
            .map(|m| m.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use federata_core::UserState;
    use federata_store::{MemoryRoleRepository, MemoryUserRepository};
    use std::sync::Mutex;

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }

        fn names(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn notify(&self, event: &AuthEvent<'_>) {
            let name = match event {
                AuthEvent::RegisterViaProvider { .. } => "registerViaProvider".to_string(),
                AuthEvent::RegisterViaProviderPost { .. } => "registerViaProvider.post".to_string(),
                AuthEvent::ProviderMapping { provider, .. } => format!("{provider}.mapping"),
            };
            self.seen.lock().unwrap().push(name);
        }
    }

    fn registrar_with(
        users: Arc<MemoryUserRepository>,
        sink: Arc<RecordingSink>,
        options: FlowOptions,
    ) -> Registrar {
        let roles = Arc::new(MemoryRoleRepository::with_roles(["user"]));
        Registrar::new(users, roles, sink, options)
    }

    fn profile_with_verified_email(email: &str) -> ProviderProfile {
        ProviderProfile {
            identifier: "ext-1".into(),
            display_name: Some("Jane Doe".into()),
            email_verified: Some(email.into()),
            ..ProviderProfile::default()
        }
    }

    #[tokio::test]
    async fn email_mapper_rejects_unverified_profiles() {
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let registrar = registrar_with(users, sink.clone(), FlowOptions::default());

        let profile = ProviderProfile::new("ext-1");
        let err = EmailVerifiedMapper::new("Facebook")
            .map_profile("facebook", &profile, &registrar)
            .await
            .unwrap_err();

        match err {
            AuthError::Validation { code, message } => {
                assert_eq!(code, OutcomeCode::CredentialInvalid);
                assert!(message.contains("Facebook"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(sink.names().is_empty());
    }

    #[tokio::test]
    async fn email_mapper_reuses_an_existing_account() {
        let users = Arc::new(MemoryUserRepository::new());
        let existing = users
            .insert(NewUser {
                email: Some("a@b.com".into()),
                password_placeholder: "local".into(),
                ..NewUser::default()
            })
            .await
            .unwrap();

        let sink = Arc::new(RecordingSink::new());
        let registrar = registrar_with(users, sink.clone(), FlowOptions::default());

        let mapped = EmailVerifiedMapper::new("Google")
            .map_profile("google", &profile_with_verified_email("a@b.com"), &registrar)
            .await
            .unwrap();

        assert_eq!(mapped.id, existing.id);
        // no registration happened, so no events either
        assert!(sink.names().is_empty());
    }

    #[tokio::test]
    async fn registration_attaches_default_role_and_state() {
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let options = FlowOptions {
            enable_user_state: true,
            default_user_state: Some(UserState::Pending),
            ..FlowOptions::default()
        };
        let registrar = registrar_with(users, sink.clone(), options);

        let created = EmailVerifiedMapper::new("Facebook")
            .map_profile("facebook", &profile_with_verified_email("new@b.com"), &registrar)
            .await
            .unwrap();

        assert_eq!(created.state, UserState::Pending);
        assert_eq!(created.roles.len(), 1);
        assert_eq!(created.roles[0].role_id, "user");
        assert_eq!(created.password_placeholder, "facebook");
        assert_eq!(
            sink.names(),
            vec!["registerViaProvider", "registerViaProvider.post"]
        );
    }

    #[tokio::test]
    async fn missing_default_role_is_a_repository_error() {
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let roles = Arc::new(MemoryRoleRepository::new());
        let registrar = Registrar::new(users, roles, sink, FlowOptions::default());

        let err = FallbackMapper
            .map_profile("myspace", &ProviderProfile::new("ext-9"), &registrar)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Repository(_)));
    }

    #[tokio::test]
    async fn github_mapper_emits_the_mapping_hook_first() {
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let registrar = registrar_with(users, sink.clone(), FlowOptions::default());

        GithubMapper
            .map_profile("github", &profile_with_verified_email("gh@b.com"), &registrar)
            .await
            .unwrap();

        assert_eq!(
            sink.names(),
            vec![
                "github.mapping",
                "registerViaProvider",
                "registerViaProvider.post"
            ]
        );
    }

    #[tokio::test]
    async fn github_mapper_requires_a_verified_email() {
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let registrar = registrar_with(users, sink.clone(), FlowOptions::default());

        let err = GithubMapper
            .map_profile("github", &ProviderProfile::new("ext-2"), &registrar)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation {
                code: OutcomeCode::CredentialInvalid,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn twitter_mapper_swaps_handle_and_first_name() {
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let registrar = registrar_with(users, sink, FlowOptions::default());

        let profile = ProviderProfile {
            identifier: "tw-1".into(),
            display_name: Some("@jane".into()),
            first_name: Some("Jane".into()),
            ..ProviderProfile::default()
        };
        let created = TwitterMapper
            .map_profile("twitter", &profile, &registrar)
            .await
            .unwrap();

        assert_eq!(created.username.as_deref(), Some("@jane"));
        assert_eq!(created.display_name.as_deref(), Some("Jane"));
        assert_eq!(created.email, None);
    }

    #[tokio::test]
    async fn registry_falls_back_for_unknown_providers() {
        let registry = MapperRegistry::with_defaults();
        let users = Arc::new(MemoryUserRepository::new());
        let sink = Arc::new(RecordingSink::new());
        let registrar = registrar_with(users, sink, FlowOptions::default());

        let profile = ProviderProfile {
            identifier: "ms-1".into(),
            display_name: Some("Jane".into()),
            email_verified: Some("jane@b.com".into()),
            ..ProviderProfile::default()
        };
        let created = registry
            .get("myspace")
            .map_profile("myspace", &profile, &registrar)
            .await
            .unwrap();

        assert_eq!(created.display_name.as_deref(), Some("Jane"));
        assert_eq!(created.email.as_deref(), Some("jane@b.com"));
        assert_eq!(created.password_placeholder, "myspace");
    }
}
