use crate::outcome::OutcomeCode;
use thiserror::Error;

/// Named fault conditions raised by an identity provider client.
///
/// Provider client libraries report faults as numeric codes; the two
/// conditions that indicate a stale or desynced external session are worth
/// naming because they warrant exactly one forced-logout retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// The provider revoked the stored session (client fault code 6).
    StaleSession,
    /// The remote session desynced from the local one (client fault code 7).
    SessionDesync,
    /// Any other client fault, carrying its numeric code.
    Other(i32),
}

impl TransportFault {
    /// Map a provider client's numeric fault code to a named condition.
    pub fn from_code(code: i32) -> Self {
        match code {
            6 => TransportFault::StaleSession,
            7 => TransportFault::SessionDesync,
            other => TransportFault::Other(other),
        }
    }

    /// The numeric code as reported by the provider client.
    pub fn code(&self) -> i32 {
        match self {
            TransportFault::StaleSession => 6,
            TransportFault::SessionDesync => 7,
            TransportFault::Other(code) => *code,
        }
    }

    /// Whether this fault warrants a single forced-logout retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransportFault::StaleSession | TransportFault::SessionDesync
        )
    }
}

/// A communication failure while talking to an identity provider.
#[derive(Debug, Clone, Error)]
#[error("provider transport fault {}: {message}", .fault.code())]
pub struct TransportError {
    /// The classified fault condition.
    pub fault: TransportFault,
    /// Client-supplied description.
    pub message: String,
}

impl TransportError {
    /// Build a transport error from a numeric client fault code.
    pub fn from_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            fault: TransportFault::from_code(code),
            message: message.into(),
        }
    }

    /// Whether this failure warrants a single forced-logout retry.
    pub fn is_recoverable(&self) -> bool {
        self.fault.is_recoverable()
    }
}

/// Errors raised by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the insert.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors that can occur during the authentication process.
///
/// These never escape the coordinator boundary: its public contract is a
/// structured outcome, and every internal error is classified before
/// returning.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Communication with the identity provider failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A domain precondition failed; surfaced verbatim in the outcome.
    #[error("{message}")]
    Validation {
        /// Outcome code the failure maps to.
        code: OutcomeCode,
        /// Human-readable explanation.
        message: String,
    },
    /// A repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The session storage failed.
    #[error("session storage error: {0}")]
    Session(String),
}

impl AuthError {
    /// Convenience constructor for mapper validation failures.
    pub fn validation(code: OutcomeCode, message: impl Into<String>) -> Self {
        AuthError::Validation {
            code,
            message: message.into(),
        }
    }
}
