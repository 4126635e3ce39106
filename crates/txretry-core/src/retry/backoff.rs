//! Jittered exponential backoff.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Source of uniformly distributed values in `[0, 1)`.
///
/// Shared by every thread using a handler, hence `&self`.
pub trait RandomSource: Send + Sync {
    fn uniform(&self) -> f64;
}

impl<F> RandomSource for F
where
    F: Fn() -> f64 + Send + Sync,
{
    fn uniform(&self) -> f64 {
        self()
    }
}

/// Draws from the calling thread's `rand` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible source backed by a seeded `StdRng`.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random::<f64>()
    }
}

/// A minimum delay that is not a whole number of milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("backoff min_delay must be a whole number of milliseconds (got {0:?})")]
pub struct SubMillisecondDelay(pub Duration);

/// Backoff parameters: the delay before retry `n` (0-based) is
/// `min_delay_ms * (1 + r) * multiplier^n`, with `r` drawn fresh per call and
/// the result rounded to whole milliseconds. The minimum is kept in whole
/// milliseconds so the rounded delay never drops below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub min_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            min_delay_ms: 50,
            multiplier: 1.5,
        }
    }
}

impl Backoff {
    pub fn new(min_delay_ms: u64, multiplier: f64) -> Self {
        Self {
            min_delay_ms,
            multiplier,
        }
    }

    /// Build from a `Duration`, rejecting sub-millisecond remainders
    /// (e.g. 400µs or 1.4ms).
    pub fn from_duration(min_delay: Duration, multiplier: f64) -> Result<Self, SubMillisecondDelay> {
        if min_delay.subsec_nanos() % 1_000_000 != 0 {
            return Err(SubMillisecondDelay(min_delay));
        }
        let ms = u64::try_from(min_delay.as_millis()).map_err(|_| SubMillisecondDelay(min_delay))?;
        Ok(Self::new(ms, multiplier))
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// Delay preceding retry number `attempt` (0 = first retry).
    pub fn delay(&self, attempt: u32, random: &dyn RandomSource) -> Duration {
        self.delay_with_jitter(attempt, random.uniform())
    }

    /// Same as [`Backoff::delay`] with an explicit jitter factor in `[0, 1)`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let base_ms = self.min_delay_ms as f64 * (1.0 + jitter);
        let exp = attempt.min(i32::MAX as u32) as i32;
        let ms = base_ms * self.multiplier.powi(exp);
        // Float-to-int casts saturate: NaN and negatives become 0, overflow u64::MAX.
        Duration::from_millis(ms.round() as u64)
    }
}
