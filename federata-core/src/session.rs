use crate::error::AuthError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Session key under which the authenticated local user id is stored.
pub const IDENTITY_KEY: &str = "identity";

/// Externally owned session storage.
///
/// The store outlives any single request; the coordinator never creates or
/// destroys it and only reads and conditionally overwrites the
/// [`IDENTITY_KEY`] entry. Implementations must provide read-your-writes
/// consistency within one request.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the whole session map.
    async fn read(&self) -> Result<HashMap<String, String>, AuthError>;

    /// Replace the whole session map.
    async fn write(&self, values: HashMap<String, String>) -> Result<(), AuthError>;
}
