//! Shared fixtures: a distinguishable test error and a recording sleeper.

#![allow(dead_code)]

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use txretry_core::{RetryHandler, RetryPolicy};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Failure with a unique id so tests can tell which attempt produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestError {
    Conflict(u64),
    Fatal(u64),
}

impl TestError {
    pub fn conflict() -> Self {
        TestError::Conflict(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn fatal() -> Self {
        TestError::Fatal(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, TestError::Conflict(_))
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Conflict(id) => write!(f, "conflict #{}", id),
            TestError::Fatal(id) => write!(f, "fatal #{}", id),
        }
    }
}

impl std::error::Error for TestError {}

/// Collects every delay the handler asks to sleep for, without sleeping.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn delays_ms(&self) -> Vec<u64> {
        self.delays
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.as_millis() as u64)
            .collect()
    }
}

impl txretry_core::retry::Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

/// maxRetries = 3, minDelay = 4ms, multiplier = 1.5, jitter fixed at 0.25.
pub fn handler() -> (RetryHandler<TestError>, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    let handler = RetryHandler::new(
        RetryPolicy::new(3, 4, 1.5),
        TestError::is_conflict,
    )
    .with_random(|| 0.25_f64)
    .with_sleeper(sleeper.clone());
    (handler, sleeper)
}
