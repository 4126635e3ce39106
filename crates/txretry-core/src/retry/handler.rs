//! Entry point for running scopes under nested-retry rules.

use std::fmt;

use super::backoff::{RandomSource, ThreadRandom};
use super::error::RetryError;
use super::policy::RetryPolicy;
use super::run::run_retry_loop;
use super::scope::{FnScope, RetryScope, ScopeKind};
use super::sleep::{Sleeper, ThreadSleeper};
use super::state::{ScopeState, ScopeStateTracker};

/// Retries nested transactional scopes at the outermost eligible level.
///
/// Every scope on a thread goes through the same handler. The first
/// [`ScopeKind::RetryRootCandidate`] (or [`ScopeKind::MustNeverRetry`]) scope
/// that finds no loop running becomes the loop owner; everything it calls
/// passes straight through. All nested scopes of one attempt must run on the
/// owner's thread. The handler itself can be shared across threads; loops on
/// different threads are independent.
pub struct RetryHandler<E> {
    pub(super) policy: RetryPolicy,
    pub(super) is_retryable: Box<dyn Fn(&E) -> bool + Send + Sync>,
    pub(super) random: Box<dyn RandomSource>,
    pub(super) sleeper: Box<dyn Sleeper>,
    pub(super) state: ScopeStateTracker,
}

impl<E> fmt::Debug for RetryHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryHandler")
            .field("policy", &self.policy)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E> RetryHandler<E> {
    /// `is_retryable` decides which failures are transient conflicts.
    pub fn new<P>(policy: RetryPolicy, is_retryable: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            policy,
            is_retryable: Box::new(is_retryable),
            random: Box::new(ThreadRandom),
            sleeper: Box::new(ThreadSleeper),
            state: ScopeStateTracker::new(),
        }
    }

    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// This handler's state on the calling thread.
    pub fn current_state(&self) -> ScopeState {
        self.state.read()
    }

    /// Run `scope`, retrying it if this call ends up owning the retry loop.
    ///
    /// Failures the handler does not retry come back as
    /// [`RetryError::Failed`] with the original error.
    pub fn handle<S>(&self, mut scope: S) -> Result<S::Output, RetryError<E>>
    where
        S: RetryScope<Error = E>,
        E: fmt::Display,
    {
        let kind = scope.kind();
        if kind == ScopeKind::MustNeverRetry {
            self.state.poison();
        }

        if self.state.read().active {
            tracing::trace!(?kind, "nested scope, deferring to enclosing retry loop");
            return scope.proceed().map_err(RetryError::Failed);
        }

        if kind == ScopeKind::NotRetryableHere {
            tracing::trace!("scope cannot own a retry loop, running once");
            return scope.proceed().map_err(RetryError::Failed);
        }

        run_retry_loop(self, &mut scope)
    }

    /// [`RetryHandler::handle`] for a closure.
    pub fn run<T, F>(&self, kind: ScopeKind, action: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
        E: fmt::Display,
    {
        self.handle(FnScope::new(kind, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    fn handler() -> RetryHandler<String> {
        RetryHandler::new(
            RetryPolicy::new(2, 1, 1.0),
            |e: &String| e == "conflict",
        )
        .with_random(|| 0.0_f64)
        .with_sleeper(|_d: Duration| {})
    }

    #[test]
    fn state_is_active_only_inside_the_owner() {
        let h = handler();
        assert!(h.current_state().is_clean());
        let seen = h
            .run(ScopeKind::RetryRootCandidate, || Ok::<_, String>(h.current_state()))
            .unwrap();
        assert!(seen.active);
        assert!(!seen.poisoned);
        assert!(h.current_state().is_clean());
    }

    #[test]
    fn nested_never_retry_poisons_only_the_current_attempt_state() {
        let h = handler();
        let seen = h
            .run(ScopeKind::RetryRootCandidate, || {
                h.run(ScopeKind::MustNeverRetry, || Ok::<_, String>(()))
                    .map_err(RetryError::into_inner)?;
                Ok(h.current_state())
            })
            .unwrap();
        assert!(seen.active && seen.poisoned);
        assert!(h.current_state().is_clean());
    }

    #[test]
    fn state_is_restored_after_a_panicking_scope() {
        let h = handler();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = h.run(ScopeKind::RetryRootCandidate, || -> Result<(), String> {
                panic!("boom")
            });
        }));
        assert!(result.is_err());
        assert!(h.current_state().is_clean());
    }

    #[test]
    fn two_handlers_on_one_thread_do_not_share_loops() {
        let outer = handler();
        let inner = handler();
        let calls = Cell::new(0);
        let err = outer
            .run(ScopeKind::NotRetryableHere, || {
                inner
                    .run(ScopeKind::RetryRootCandidate, || {
                        calls.set(calls.get() + 1);
                        Err::<(), _>("conflict".to_string())
                    })
                    .map_err(RetryError::into_inner)
            })
            .unwrap_err();
        // The inner handler owned its own loop: 1 + max_retries runs.
        assert_eq!(calls.get(), 3);
        assert_eq!(err.into_inner(), "conflict");
    }
}
