use async_trait::async_trait;
use federata_core::{AuthenticationOutcome, OutcomeCode};
use http::request::Parts;

/// One adapter in a multi-adapter authentication pipeline.
///
/// Adapters communicate with the pipeline solely through the returned
/// outcome; there is no shared adapter state to inspect.
#[async_trait]
pub trait AuthenticationAdapter: Send + Sync {
    /// Attempt to authenticate the request.
    async fn authenticate(&self, parts: &Parts) -> AuthenticationOutcome;
}

/// Runs adapters in order until one produces an authoritative outcome.
///
/// An outcome with a [`Halt`](federata_core::Disposition::Halt) disposition
/// stops the chain, whether it succeeded or not; `Continue` failures let
/// the next adapter try. The last produced outcome is returned.
#[derive(Default)]
pub struct AdapterChain {
    adapters: Vec<Box<dyn AuthenticationAdapter>>,
}

impl AdapterChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter to the chain.
    pub fn adapter(mut self, adapter: impl AuthenticationAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Run the chain against the request.
    pub async fn authenticate(&self, parts: &Parts) -> AuthenticationOutcome {
        let mut last = AuthenticationOutcome::failure(
            OutcomeCode::IdentityNotFound,
            "no adapter handled the request",
        );
        for adapter in &self.adapters {
            last = adapter.authenticate(parts).await;
            if last.halts_chain() {
                break;
            }
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedAdapter {
        outcome: AuthenticationOutcome,
        calls: Arc<AtomicUsize>,
    }

    impl FixedAdapter {
        fn new(outcome: AuthenticationOutcome) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    outcome,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl AuthenticationAdapter for FixedAdapter {
        async fn authenticate(&self, _parts: &Parts) -> AuthenticationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn parts() -> Parts {
        Request::builder()
            .uri("/login")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn continue_failures_fall_through_to_the_next_adapter() {
        let (first, first_calls) = FixedAdapter::new(AuthenticationOutcome::failure(
            OutcomeCode::InvalidProvider,
            "Invalid provider",
        ));
        let (second, second_calls) = FixedAdapter::new(AuthenticationOutcome::success("user-1"));

        let chain = AdapterChain::new().adapter(first).adapter(second);
        let outcome = chain.authenticate(&parts()).await;

        assert!(outcome.satisfied());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn halting_failures_stop_the_chain() {
        let (first, _) = FixedAdapter::new(
            AuthenticationOutcome::failure(OutcomeCode::CredentialInvalid, "verify your email")
                .halting(),
        );
        let (second, second_calls) = FixedAdapter::new(AuthenticationOutcome::success("user-1"));

        let chain = AdapterChain::new().adapter(first).adapter(second);
        let outcome = chain.authenticate(&parts()).await;

        assert_eq!(outcome.code, OutcomeCode::CredentialInvalid);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_stops_the_chain() {
        let (first, _) = FixedAdapter::new(AuthenticationOutcome::success("user-1"));
        let (second, second_calls) = FixedAdapter::new(AuthenticationOutcome::success("user-2"));

        let chain = AdapterChain::new().adapter(first).adapter(second);
        let outcome = chain.authenticate(&parts()).await;

        assert_eq!(outcome.identity.as_deref(), Some("user-1"));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_chain_reports_identity_not_found() {
        let outcome = AdapterChain::new().authenticate(&parts()).await;
        assert_eq!(outcome.code, OutcomeCode::IdentityNotFound);
    }
}
