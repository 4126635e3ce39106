//! Retry loop run by the outermost eligible scope.

use std::fmt;

use super::error::{ExceededReason, RetriesExceededError, RetryError};
use super::guard::RestoreGuard;
use super::handler::RetryHandler;
use super::policy::RetryDecision;
use super::scope::RetryScope;
use super::state::ScopeState;

/// Runs `scope` until it succeeds, fails non-retryably, is poisoned, or the
/// retry budget is spent. Every attempt starts from the state captured on
/// entry with `active` set; on any exit the thread's state is handed back
/// with `poisoned` cleared.
pub(super) fn run_retry_loop<S, E>(
    handler: &RetryHandler<E>,
    scope: &mut S,
) -> Result<S::Output, RetryError<E>>
where
    S: RetryScope<Error = E>,
    E: fmt::Display,
{
    let saved = handler.state.read();
    let _restore = RestoreGuard {
        tracker: &handler.state,
        restore: ScopeState {
            poisoned: false,
            ..saved
        },
    };
    let max_retries = handler.policy.max_retries;

    let mut attempt = 0u32;
    loop {
        handler.state.write(ScopeState {
            active: true,
            ..saved
        });

        let err = match scope.proceed() {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !(handler.is_retryable)(&err) {
            return Err(RetryError::Failed(err));
        }

        let poisoned = handler.state.read().poisoned;
        match handler
            .policy
            .decide(attempt, poisoned, &*handler.random)
        {
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(
                    attempt,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transaction conflict, retrying"
                );
                handler.sleeper.sleep(delay);
                attempt += 1;
            }
            RetryDecision::Abort(reason) => {
                match reason {
                    ExceededReason::Exhausted => tracing::warn!(
                        max_retries,
                        error = %err,
                        "maximum number of transaction retries exceeded, aborting"
                    ),
                    ExceededReason::Poisoned => tracing::warn!(
                        attempt,
                        error = %err,
                        "transaction conflict in a scope marked never-retry, aborting"
                    ),
                }
                return Err(RetriesExceededError::new(reason, attempt + 1, err).into());
            }
        }
    }
}
