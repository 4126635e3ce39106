//! Errors surfaced by the retry handler.

use std::fmt;

/// Why the retry loop gave up on a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceededReason {
    /// `max_retries` retries were made and the last one failed too.
    Exhausted,
    /// A nested scope declared the attempt must never be retried.
    Poisoned,
}

/// Terminal failure of a retry loop; wraps the failure of the last attempt.
#[derive(Debug)]
pub struct RetriesExceededError<E> {
    reason: ExceededReason,
    attempts: u32,
    last_error: E,
}

impl<E> RetriesExceededError<E> {
    pub fn new(reason: ExceededReason, attempts: u32, last_error: E) -> Self {
        Self {
            reason,
            attempts,
            last_error,
        }
    }

    pub fn reason(&self) -> ExceededReason {
        self.reason
    }

    /// Number of times the unit of work was run, including the first.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> &E {
        &self.last_error
    }

    pub fn into_last_error(self) -> E {
        self.last_error
    }
}

impl<E: fmt::Display> fmt::Display for RetriesExceededError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ExceededReason::Exhausted => write!(
                f,
                "transaction retries exceeded after {} attempts: {}",
                self.attempts, self.last_error
            ),
            ExceededReason::Poisoned => write!(
                f,
                "transaction marked as no-retry, aborted after {} attempt(s): {}",
                self.attempts, self.last_error
            ),
        }
    }
}

impl<E> std::error::Error for RetriesExceededError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Outcome of [`RetryHandler::handle`](super::RetryHandler::handle) on failure.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The unit of work failed and was not retried; the error is unchanged.
    Failed(E),
    /// A retryable failure could not be retried any further.
    RetriesExceeded(RetriesExceededError<E>),
}

impl<E> RetryError<E> {
    /// The underlying failure, dropping retry bookkeeping. Lets a nested
    /// `handle` call be forwarded with `?` from inside an enclosing scope.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Failed(e) => e,
            RetryError::RetriesExceeded(e) => e.into_last_error(),
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            RetryError::Failed(e) => e,
            RetryError::RetriesExceeded(e) => e.last_error(),
        }
    }

    pub fn retries_exceeded(&self) -> Option<&RetriesExceededError<E>> {
        match self {
            RetryError::Failed(_) => None,
            RetryError::RetriesExceeded(e) => Some(e),
        }
    }

    pub fn is_retries_exceeded(&self) -> bool {
        matches!(self, RetryError::RetriesExceeded(_))
    }
}

impl<E> From<RetriesExceededError<E>> for RetryError<E> {
    fn from(e: RetriesExceededError<E>) -> Self {
        RetryError::RetriesExceeded(e)
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Failed(e) => write!(f, "{}", e),
            RetryError::RetriesExceeded(e) => write!(f, "{}", e),
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Failed(e) => e.source(),
            RetryError::RetriesExceeded(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug, PartialEq)]
    struct Conflict(u32);

    impl fmt::Display for Conflict {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "conflict #{}", self.0)
        }
    }

    impl Error for Conflict {}

    #[test]
    fn exceeded_message_names_attempts_and_cause() {
        let e = RetriesExceededError::new(ExceededReason::Exhausted, 4, Conflict(3));
        assert_eq!(
            e.to_string(),
            "transaction retries exceeded after 4 attempts: conflict #3"
        );
        let p = RetriesExceededError::new(ExceededReason::Poisoned, 1, Conflict(0));
        assert!(p.to_string().starts_with("transaction marked as no-retry"));
    }

    #[test]
    fn source_chain_reaches_last_error() {
        let err: RetryError<Conflict> =
            RetriesExceededError::new(ExceededReason::Exhausted, 2, Conflict(9)).into();
        let exceeded = err.source().unwrap();
        let cause = exceeded.source().unwrap();
        assert_eq!(cause.downcast_ref::<Conflict>(), Some(&Conflict(9)));
    }

    #[test]
    fn into_inner_unwraps_both_variants() {
        assert_eq!(RetryError::Failed(Conflict(1)).into_inner(), Conflict(1));
        let exceeded: RetryError<Conflict> =
            RetriesExceededError::new(ExceededReason::Poisoned, 1, Conflict(2)).into();
        assert!(exceeded.is_retries_exceeded());
        assert_eq!(exceeded.inner(), &Conflict(2));
        assert_eq!(exceeded.into_inner(), Conflict(2));
    }
}
