//! # Federata
//!
//! A modular social authentication framework: it authenticates a visitor
//! against a third-party identity provider, resolves the external identity
//! to a local account (auto-creating and linking one when permitted),
//! gates on account state and establishes a session identity.
//!
//! The foundational types and ports live in [`federata_core`] and are
//! re-exported at the crate root; the orchestration lives behind the
//! `flow` feature and the in-memory stores behind the `store` feature.

#![warn(missing_docs)]

pub use federata_core::*;

/// Flow orchestration: coordinator, mappers, registrar and pipeline.
#[cfg(feature = "flow")]
pub use federata_flow as flow;

/// In-memory storage implementations.
#[cfg(feature = "store")]
pub use federata_store as store;
