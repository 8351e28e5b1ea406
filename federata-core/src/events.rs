use crate::profile::ProviderProfile;
use crate::user::{LocalUser, NewUser};

/// Lifecycle notifications emitted around social registration.
#[derive(Debug)]
pub enum AuthEvent<'a> {
    /// A user auto-created from a provider profile is about to be persisted.
    RegisterViaProvider {
        /// The user as it will be inserted.
        user: &'a NewUser,
        /// Provider the profile came from.
        provider: &'a str,
        /// The external profile.
        profile: &'a ProviderProfile,
    },
    /// A user auto-created from a provider profile was persisted.
    RegisterViaProviderPost {
        /// The persisted user, id assigned.
        user: &'a LocalUser,
        /// Provider the profile came from.
        provider: &'a str,
        /// The external profile.
        profile: &'a ProviderProfile,
    },
    /// A provider-specific mapper is handing a user to registration. Emitted
    /// by mappers that expose an enrichment hook (e.g. github).
    ProviderMapping {
        /// Provider running the mapping.
        provider: &'a str,
        /// The user about to be registered.
        user: &'a NewUser,
        /// The external profile.
        profile: &'a ProviderProfile,
    },
}

/// Synchronous, fire-and-forget observer for lifecycle events.
///
/// Sinks are extension points only: the core flow must stay correct with no
/// sink attached, and must never depend on a sink's side effects.
pub trait EventSink: Send + Sync {
    /// Observe one event.
    fn notify(&self, event: &AuthEvent<'_>);
}

/// Sink that discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _event: &AuthEvent<'_>) {}
}

/// Sink that forwards events to the `log` facade.
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&self, event: &AuthEvent<'_>) {
        match event {
            AuthEvent::RegisterViaProvider { provider, .. } => {
                log::info!("registering a new user via {provider}");
            }
            AuthEvent::RegisterViaProviderPost { user, provider, .. } => {
                log::info!("registered user {} via {provider}", user.id);
            }
            AuthEvent::ProviderMapping { provider, .. } => {
                log::debug!("mapping a {provider} profile to a local user");
            }
        }
    }
}
