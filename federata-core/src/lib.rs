//! # Federata Core
//!
//! `federata-core` provides the foundational traits and types for the Federata
//! social authentication framework. It defines the data model (profiles, users,
//! links, outcomes), the error taxonomy, and the ports the flow crate
//! orchestrates: the identity provider client, the repositories, the session
//! storage and the lifecycle event sink.

#![warn(missing_docs)]

/// Normalized external profile data.
pub mod profile;

/// Local users, roles and provider links.
pub mod user;

/// Structured authentication outcomes.
pub mod outcome;

/// Errors that can occur during the authentication process.
pub mod error;

/// Port wrapping a concrete identity provider client.
pub mod client;

/// Externally owned session storage.
pub mod session;

/// Repository ports for users, links and roles.
pub mod repository;

/// Lifecycle event types and sinks.
pub mod events;

pub use client::{IdentityProviderClient, ProviderSession};
pub use error::{AuthError, RepositoryError, TransportError, TransportFault};
pub use events::{AuthEvent, EventSink, LogSink, NullSink};
pub use outcome::{AuthenticationOutcome, Disposition, OutcomeCode};
pub use profile::ProviderProfile;
pub use repository::{RoleRepository, UserLinkRepository, UserRepository};
pub use session::{SessionStorage, IDENTITY_KEY};
pub use user::{LocalUser, NewUser, Role, UserLink, UserState};
