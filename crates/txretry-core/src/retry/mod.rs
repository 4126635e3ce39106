//! Nested-scope retry engine.
//!
//! A [`RetryHandler`] wraps every transactional scope on a thread. Retries
//! happen only at the outermost scope able to own them; nested scopes run
//! straight through and may only veto retrying of the whole attempt.
//! Backoff is exponential with per-retry random jitter.

mod backoff;
mod error;
mod guard;
mod handler;
mod policy;
mod run;
mod scope;
mod sleep;
mod state;

pub use backoff::{Backoff, RandomSource, SeededRandom, SubMillisecondDelay, ThreadRandom};
pub use error::{ExceededReason, RetriesExceededError, RetryError};
pub use handler::RetryHandler;
pub use policy::{RetryDecision, RetryPolicy};
pub use scope::{FnScope, RetryScope, ScopeKind};
pub use sleep::{Sleeper, ThreadSleeper};
pub use state::{ScopeState, ScopeStateTracker};
