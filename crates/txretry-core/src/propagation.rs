//! Derive a scope's [`ScopeKind`] from its transaction propagation mode.
//!
//! Only scopes that may begin a transaction can own a retry loop: retrying
//! a scope that joined someone else's transaction would replay half of it.

use serde::{Deserialize, Serialize};

use crate::retry::ScopeKind;

/// How a transactional scope relates to an already running transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Join the current transaction or start one.
    #[default]
    Required,
    /// Join if present, otherwise run without a transaction.
    Supports,
    /// Join the current transaction; fail if there is none.
    Mandatory,
    /// Always start a new transaction, suspending the current one.
    RequiresNew,
    /// Suspend the current transaction and run without one.
    NotSupported,
    /// Fail if a transaction is running.
    Never,
    /// Run in a savepoint of the current transaction, or start one.
    Nested,
}

impl Propagation {
    /// Whether entering a scope with this mode may start a transaction.
    pub fn may_initiate(self) -> bool {
        matches!(
            self,
            Propagation::Required | Propagation::RequiresNew | Propagation::Nested
        )
    }
}

/// Map a scope's propagation and its no-retry marker to a [`ScopeKind`].
/// The marker wins over everything else.
pub fn scope_kind(propagation: Propagation, no_retry: bool) -> ScopeKind {
    if no_retry {
        ScopeKind::MustNeverRetry
    } else if propagation.may_initiate() {
        ScopeKind::RetryRootCandidate
    } else {
        ScopeKind::NotRetryableHere
    }
}
