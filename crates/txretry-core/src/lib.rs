//! Retry engine for transactional units of work that may hit transient
//! conflicts (serialization failures, deadlocks), with correct behavior
//! when such units of work nest.
//!
//! The engine lives in [`retry`]; [`classify`] and [`propagation`] turn
//! database errors and transaction propagation modes into the predicate and
//! scope kinds the engine consumes.

pub mod classify;
pub mod config;
pub mod logging;
pub mod propagation;
pub mod retry;

pub use retry::{
    RetriesExceededError, RetryError, RetryHandler, RetryPolicy, RetryScope, ScopeKind,
};
