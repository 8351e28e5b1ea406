use crate::mapper::{MapperRegistry, Registrar};
use crate::options::FlowOptions;
use crate::pipeline::AuthenticationAdapter;
use async_trait::async_trait;
use federata_core::{
    AuthError, AuthenticationOutcome, EventSink, IdentityProviderClient, NullSink, OutcomeCode,
    ProviderProfile, RepositoryError, RoleRepository, SessionStorage, UserLink,
    UserLinkRepository, UserRepository, IDENTITY_KEY,
};
use http::request::Parts;
use log::{debug, warn};
use std::sync::Arc;

const MSG_INVALID_PROVIDER: &str = "Invalid provider";
const MSG_IDENTITY_NOT_FOUND: &str = "A record with the supplied identity could not be found.";
const MSG_NOT_ACTIVE: &str = "A record with the supplied identity is not active.";

/// Orchestrates a social login attempt end to end.
///
/// The coordinator owns no mutable state; every collaborator is injected at
/// construction time through [`CoordinatorBuilder`]. Its public contract
/// never raises: each attempt runs to a terminal
/// [`AuthenticationOutcome`], with every internal fault classified along
/// the way. Re-invoking [`authenticate`](Self::authenticate) is idempotent
/// and re-runs from the session fast path.
pub struct AuthenticationCoordinator {
    client: Arc<dyn IdentityProviderClient>,
    links: Arc<dyn UserLinkRepository>,
    users: Arc<dyn UserRepository>,
    session: Arc<dyn SessionStorage>,
    options: FlowOptions,
    mappers: MapperRegistry,
    registrar: Registrar,
}

impl AuthenticationCoordinator {
    /// Start building a coordinator over the required collaborators.
    pub fn builder(
        client: Arc<dyn IdentityProviderClient>,
        links: Arc<dyn UserLinkRepository>,
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        session: Arc<dyn SessionStorage>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder {
            client,
            links,
            users,
            roles,
            session,
            events: Arc::new(NullSink),
            options: FlowOptions::default(),
            mappers: MapperRegistry::with_defaults(),
        }
    }

    /// Run one authentication attempt for the given request.
    pub async fn authenticate(&self, parts: &Parts) -> AuthenticationOutcome {
        // Completed-authentication fast path: a session that already
        // carries an identity wins without contacting any provider.
        match self.session.read().await {
            Ok(values) => {
                if let Some(identity) = values.get(IDENTITY_KEY) {
                    debug!("session already carries identity {identity}");
                    return AuthenticationOutcome::success(identity.clone());
                }
            }
            Err(err) => {
                return AuthenticationOutcome::failure(OutcomeCode::Uncategorized, err.to_string())
            }
        }

        let provider = match utils::query_param(parts, "provider") {
            Some(p) if self.options.provider_enabled(&p) => p,
            _ => {
                warn!("authentication attempted with a missing or disabled provider");
                return AuthenticationOutcome::failure(
                    OutcomeCode::InvalidProvider,
                    MSG_INVALID_PROVIDER,
                );
            }
        };

        let handle = match self.client.authenticate(&provider).await {
            Ok(handle) => handle,
            Err(err) if err.is_recoverable() => {
                // The stored provider session went stale (e.g. the user
                // unsubscribed from the app on the provider side). Force a
                // logout and retry exactly once.
                debug!("stale {provider} session ({err}); forcing logout and retrying once");
                let retried = match self.client.logout(&provider).await {
                    Ok(()) => self.client.authenticate(&provider).await,
                    Err(err) => Err(err),
                };
                match retried {
                    Ok(handle) => handle,
                    Err(err) => {
                        warn!("{provider} handshake failed after retry: {err}");
                        return AuthenticationOutcome::failure(
                            OutcomeCode::InvalidProvider,
                            MSG_INVALID_PROVIDER,
                        );
                    }
                }
            }
            Err(err) => {
                warn!("{provider} handshake failed: {err}");
                return AuthenticationOutcome::failure(
                    OutcomeCode::InvalidProvider,
                    MSG_INVALID_PROVIDER,
                );
            }
        };

        let profile = if handle.is_user_connected() {
            handle.user_profile()
        } else {
            None
        };
        let Some(profile) = profile else {
            return AuthenticationOutcome::failure(
                OutcomeCode::IdentityNotFound,
                MSG_IDENTITY_NOT_FOUND,
            );
        };

        let link = match self.resolve_link(&provider, &profile).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                return AuthenticationOutcome::failure(
                    OutcomeCode::IdentityNotFound,
                    MSG_IDENTITY_NOT_FOUND,
                )
            }
            Err(outcome) => return outcome,
        };

        if self.options.enable_user_state {
            let user = match self.users.find_by_id(&link.user_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    return AuthenticationOutcome::failure(
                        OutcomeCode::Uncategorized,
                        format!("linked account {} could not be loaded", link.user_id),
                    )
                }
                Err(err) => {
                    return AuthenticationOutcome::failure(
                        OutcomeCode::Uncategorized,
                        err.to_string(),
                    )
                }
            };
            if !self.options.login_permitted(user.state) {
                debug!("login denied for {} in state {:?}", user.id, user.state);
                return AuthenticationOutcome::failure(
                    OutcomeCode::AccountNotActive,
                    MSG_NOT_ACTIVE,
                );
            }
        }

        match self.write_identity(&link.user_id).await {
            Ok(()) => AuthenticationOutcome::success(link.user_id),
            Err(err) => AuthenticationOutcome::failure(OutcomeCode::Uncategorized, err.to_string()),
        }
    }

    /// Resolve the link for this external identity, auto-creating a local
    /// account when configured. `Err` carries a ready-made failure outcome.
    async fn resolve_link(
        &self,
        provider: &str,
        profile: &ProviderProfile,
    ) -> Result<Option<UserLink>, AuthenticationOutcome> {
        let found = self
            .links
            .find_by_provider_id(&profile.identifier, provider)
            .await
            .map_err(|err| {
                AuthenticationOutcome::failure(OutcomeCode::Uncategorized, err.to_string())
            })?;
        if let Some(link) = found {
            return Ok(Some(link));
        }
        if !self.options.create_user_auto_social {
            return Ok(None);
        }

        let mapper = self.mappers.get(provider);
        let user = match mapper.map_profile(provider, profile, &self.registrar).await {
            Ok(user) => user,
            Err(AuthError::Validation { code, message }) => {
                // Terminal precondition failure; authoritative for the
                // whole pipeline even though it is a failure.
                return Err(AuthenticationOutcome::failure(code, message).halting());
            }
            Err(err) => {
                return Err(AuthenticationOutcome::failure(
                    OutcomeCode::Uncategorized,
                    err.to_string(),
                ))
            }
        };

        let link = UserLink::new(user.id, profile.identifier.clone(), provider);
        match self.links.insert(&link).await {
            Ok(()) => Ok(Some(link)),
            Err(RepositoryError::Conflict(_)) => {
                // A concurrent first login won the race; converge on the
                // winner's link.
                debug!(
                    "link for ({}, {provider}) already exists; re-reading",
                    profile.identifier
                );
                match self
                    .links
                    .find_by_provider_id(&profile.identifier, provider)
                    .await
                {
                    Ok(Some(link)) => Ok(Some(link)),
                    Ok(None) => Err(AuthenticationOutcome::failure(
                        OutcomeCode::Uncategorized,
                        "link insert conflicted but no link was found",
                    )),
                    Err(err) => Err(AuthenticationOutcome::failure(
                        OutcomeCode::Uncategorized,
                        err.to_string(),
                    )),
                }
            }
            Err(err) => Err(AuthenticationOutcome::failure(
                OutcomeCode::Uncategorized,
                err.to_string(),
            )),
        }
    }

    async fn write_identity(&self, user_id: &str) -> Result<(), AuthError> {
        let mut values = self.session.read().await?;
        values.insert(IDENTITY_KEY.to_string(), user_id.to_string());
        self.session.write(values).await
    }
}

#[async_trait]
impl AuthenticationAdapter for AuthenticationCoordinator {
    async fn authenticate(&self, parts: &Parts) -> AuthenticationOutcome {
        AuthenticationCoordinator::authenticate(self, parts).await
    }
}

/// Builder wiring all collaborators into an [`AuthenticationCoordinator`].
pub struct CoordinatorBuilder {
    client: Arc<dyn IdentityProviderClient>,
    links: Arc<dyn UserLinkRepository>,
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    session: Arc<dyn SessionStorage>,
    events: Arc<dyn EventSink>,
    options: FlowOptions,
    mappers: MapperRegistry,
}

impl CoordinatorBuilder {
    /// Set the flow configuration.
    pub fn options(mut self, options: FlowOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the lifecycle event sink. Defaults to [`NullSink`].
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Replace the mapper registry. Defaults to the stock provider
    /// policies.
    pub fn mappers(mut self, mappers: MapperRegistry) -> Self {
        self.mappers = mappers;
        self
    }

    /// Build the coordinator.
    pub fn build(self) -> AuthenticationCoordinator {
        let registrar = Registrar::new(
            self.users.clone(),
            self.roles,
            self.events,
            self.options.clone(),
        );
        AuthenticationCoordinator {
            client: self.client,
            links: self.links,
            users: self.users,
            session: self.session,
            options: self.options,
            mappers: self.mappers,
            registrar,
        }
    }
}

/// Request parsing helpers.
pub mod utils {
    use http::request::Parts;

    /// Extract a non-empty query parameter from the request URI.
    pub fn query_param(parts: &Parts, name: &str) -> Option<String> {
        let query = parts.uri.query()?;
        for pair in query.split('&') {
            let mut kv = pair.splitn(2, '=');
            if kv.next() == Some(name) {
                let value = kv.next().unwrap_or("");
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
        None
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use http::Request;

        fn parts(uri: &str) -> Parts {
            Request::builder().uri(uri).body(()).unwrap().into_parts().0
        }

        #[test]
        fn reads_the_named_parameter() {
            let parts = parts("/login?foo=bar&provider=github");
            assert_eq!(query_param(&parts, "provider").as_deref(), Some("github"));
        }

        #[test]
        fn empty_or_missing_values_yield_none() {
            assert_eq!(query_param(&parts("/login?provider="), "provider"), None);
            assert_eq!(query_param(&parts("/login?other=x"), "provider"), None);
            assert_eq!(query_param(&parts("/login"), "provider"), None);
        }
    }
}
