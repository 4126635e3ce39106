use std::time::Duration;

use super::backoff::{Backoff, RandomSource};
use super::error::ExceededReason;

/// Decision taken by the loop owner after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given delay, then run the next attempt.
    RetryAfter(Duration),
    /// Stop and surface the failure as retries exceeded.
    Abort(ExceededReason),
}

/// Retry budget and backoff for a handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, min_delay_ms: u64, multiplier: f64) -> Self {
        Self {
            max_retries,
            backoff: Backoff::new(min_delay_ms, multiplier),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Decide what follows a retryable failure of attempt `attempt` (0-based).
    ///
    /// Poisoning wins over any remaining budget. Randomness is only drawn
    /// when a retry is actually scheduled.
    pub fn decide(&self, attempt: u32, poisoned: bool, random: &dyn RandomSource) -> RetryDecision {
        if poisoned {
            return RetryDecision::Abort(ExceededReason::Poisoned);
        }
        if attempt >= self.max_retries {
            return RetryDecision::Abort(ExceededReason::Exhausted);
        }
        RetryDecision::RetryAfter(self.backoff.delay(attempt, random))
    }

    /// Delays a permanently failing unit of work would sleep through.
    pub fn schedule(&self, random: &dyn RandomSource) -> Vec<Duration> {
        (0..self.max_retries)
            .map(|attempt| self.backoff.delay(attempt, random))
            .collect()
    }
}
