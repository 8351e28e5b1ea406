use serde::{Deserialize, Serialize};

/// Terminal classification of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeCode {
    /// Authentication succeeded and a session identity was established.
    Success,
    /// The requested provider is missing, not enabled, or its handshake
    /// failed terminally.
    InvalidProvider,
    /// No external profile was obtained, or no local account could be
    /// resolved for it.
    IdentityNotFound,
    /// A mapper precondition failed, e.g. the provider did not assert a
    /// verified email.
    CredentialInvalid,
    /// The resolved account's state does not permit login.
    AccountNotActive,
    /// Any fault that fits no category above.
    Uncategorized,
}

/// What a surrounding multi-adapter pipeline should do after an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Later adapters may still attempt the request.
    Continue,
    /// This result is authoritative; no further adapters run.
    Halt,
}

/// The structured result of one authentication attempt.
///
/// This value is the only coordination channel between an adapter and the
/// surrounding pipeline; there is no mutable adapter state to inspect.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticationOutcome {
    /// Terminal classification.
    pub code: OutcomeCode,
    /// The authenticated local user id, on success.
    pub identity: Option<String>,
    /// Ordered human-readable messages.
    pub messages: Vec<String>,
    /// Chain-control signal.
    pub disposition: Disposition,
}

impl AuthenticationOutcome {
    /// A successful, authoritative outcome for the given identity.
    pub fn success(identity: impl Into<String>) -> Self {
        Self {
            code: OutcomeCode::Success,
            identity: Some(identity.into()),
            messages: vec!["Authentication successful.".to_string()],
            disposition: Disposition::Halt,
        }
    }

    /// A failure outcome. Defaults to [`Disposition::Continue`] so later
    /// adapters may still run; use [`halting`](Self::halting) for terminal
    /// validation failures.
    pub fn failure(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            code,
            identity: None,
            messages: vec![message.into()],
            disposition: Disposition::Continue,
        }
    }

    /// Mark this outcome authoritative for the whole pipeline.
    pub fn halting(mut self) -> Self {
        self.disposition = Disposition::Halt;
        self
    }

    /// Whether the attempt reached an authoritative successful result.
    pub fn satisfied(&self) -> bool {
        self.code == OutcomeCode::Success
    }

    /// Whether a surrounding pipeline should stop after this outcome.
    pub fn halts_chain(&self) -> bool {
        self.disposition == Disposition::Halt
    }
}
