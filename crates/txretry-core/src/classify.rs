//! Classify database failures as transient transaction conflicts.
//!
//! The retry engine only needs a `Fn(&E) -> bool`. These helpers build one
//! from SQLSTATE codes, which is how most drivers report serialization
//! failures and deadlocks.

use std::error::Error;

pub const SQL_STATE_SERIALIZATION_FAILURE: &str = "40001";
pub const SQL_STATE_DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    SerializationFailure,
    DeadlockDetected,
    Other,
}

impl ConflictKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ConflictKind::Other)
    }
}

/// Classify a SQLSTATE code.
pub fn classify_sql_state(sql_state: &str) -> ConflictKind {
    match sql_state {
        SQL_STATE_SERIALIZATION_FAILURE => ConflictKind::SerializationFailure,
        SQL_STATE_DEADLOCK_DETECTED => ConflictKind::DeadlockDetected,
        _ => ConflictKind::Other,
    }
}

/// Last error in the `source()` chain.
pub fn root_cause<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

/// Driver error types that carry a SQLSTATE.
pub trait SqlStateError {
    fn sql_state(&self) -> Option<&str>;
}

/// True when the root cause of `err` is a `D` whose SQLSTATE is a
/// serialization failure or deadlock. Wrapping layers (e.g. a commit error
/// around the driver error) are looked through.
pub fn is_retryable_error<D>(err: &(dyn Error + 'static)) -> bool
where
    D: SqlStateError + Error + 'static,
{
    root_cause(err)
        .downcast_ref::<D>()
        .and_then(SqlStateError::sql_state)
        .map(|state| classify_sql_state(state).is_retryable())
        .unwrap_or(false)
}

/// Ready-made error type for units of work that have no error type of their own.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("database error (SQLSTATE {sql_state}): {message}")]
    Database { sql_state: String, message: String },
    #[error("could not acquire lock: {0}")]
    LockAcquisition(String),
    #[error("concurrent modification: {0}")]
    ConcurrencyFailure(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransactionError {
    pub fn database(sql_state: impl Into<String>, message: impl Into<String>) -> Self {
        TransactionError::Database {
            sql_state: sql_state.into(),
            message: message.into(),
        }
    }

    pub fn serialization_failure(message: impl Into<String>) -> Self {
        Self::database(SQL_STATE_SERIALIZATION_FAILURE, message)
    }

    /// Lock and concurrency failures always retry; database errors retry by
    /// SQLSTATE; anything else retries only if its root cause is a
    /// retryable database error.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransactionError::LockAcquisition(_) | TransactionError::ConcurrencyFailure(_) => true,
            TransactionError::Database { sql_state, .. } => {
                classify_sql_state(sql_state).is_retryable()
            }
            TransactionError::Other(e) => is_retryable_error::<TransactionError>(e.root_cause()),
        }
    }
}

impl SqlStateError for TransactionError {
    fn sql_state(&self) -> Option<&str> {
        match self {
            TransactionError::Database { sql_state, .. } => Some(sql_state),
            _ => None,
        }
    }
}
