//! # Federata Flow
//!
//! `federata-flow` orchestrates the social login flow: it validates the
//! requested provider, runs the external handshake (with a single bounded
//! retry on stale provider sessions), resolves or auto-creates the local
//! account link, gates on account state and establishes the session
//! identity.
//!
//! ## Key components
//!
//! - **[`AuthenticationCoordinator`]**: the login/link/create state machine.
//! - **[`ProfileMapper`] / [`MapperRegistry`]**: per-provider policies for
//!   turning an external profile into a local user.
//! - **[`Registrar`]**: the single choke point through which every
//!   auto-created social user is persisted.
//! - **[`AdapterChain`]**: a minimal multi-adapter pipeline honoring the
//!   stop-propagation disposition of returned outcomes.

#![warn(missing_docs)]

/// The authentication coordinator.
pub mod coordinator;

/// Profile-to-user mapper policies and the registrar.
pub mod mapper;

/// Configuration surface consumed by the flow.
pub mod options;

/// Multi-adapter authentication pipeline.
pub mod pipeline;

pub use coordinator::{AuthenticationCoordinator, CoordinatorBuilder};
pub use mapper::{
    DisplayNameMapper, EmailVerifiedMapper, FallbackMapper, GithubMapper, MapperRegistry,
    ProfileMapper, Registrar, TwitterMapper,
};
pub use options::FlowOptions;
pub use pipeline::{AdapterChain, AuthenticationAdapter};
