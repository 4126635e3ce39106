//! Units of work and the retry capability they declare.

/// What a scope allows the handler to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScopeKind {
    /// May own the retry loop if no enclosing loop is running.
    #[default]
    RetryRootCandidate,
    /// Never owns a retry loop, but an enclosing loop may still retry.
    NotRetryableHere,
    /// Has side effects that make retrying the enclosing attempt unsafe.
    /// Poisons the current attempt as soon as it is entered.
    MustNeverRetry,
}

/// A unit of work that can be run (and re-run) by a
/// [`RetryHandler`](super::RetryHandler).
pub trait RetryScope {
    type Output;
    type Error;

    fn kind(&self) -> ScopeKind;

    /// Run the work once. Called again for every retry.
    fn proceed(&mut self) -> Result<Self::Output, Self::Error>;
}

/// Closure-backed scope.
pub struct FnScope<F> {
    kind: ScopeKind,
    action: F,
}

impl<F> FnScope<F> {
    pub fn new(kind: ScopeKind, action: F) -> Self {
        Self { kind, action }
    }

    pub fn candidate(action: F) -> Self {
        Self::new(ScopeKind::RetryRootCandidate, action)
    }
}

impl<F, T, E> RetryScope for FnScope<F>
where
    F: FnMut() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn kind(&self) -> ScopeKind {
        self.kind
    }

    fn proceed(&mut self) -> Result<T, E> {
        (self.action)()
    }
}

impl<F> std::fmt::Debug for FnScope<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnScope")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
