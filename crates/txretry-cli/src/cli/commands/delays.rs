//! Delays command: print the backoff schedule.

use anyhow::Result;
use std::time::Duration;
use txretry_core::retry::{RandomSource, SeededRandom, ThreadRandom};
use txretry_core::RetryPolicy;

/// Delays before each retry; the policy's full schedule unless `attempts` is given.
pub fn delay_schedule(
    policy: &RetryPolicy,
    attempts: Option<u32>,
    random: &dyn RandomSource,
) -> Vec<Duration> {
    match attempts {
        Some(n) => (0..n)
            .map(|attempt| policy.backoff.delay(attempt, random))
            .collect(),
        None => policy.schedule(random),
    }
}

pub fn run_delays(policy: &RetryPolicy, attempts: Option<u32>, seed: Option<u64>) -> Result<()> {
    let random: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };
    for (attempt, delay) in delay_schedule(policy, attempts, &*random).iter().enumerate() {
        println!("retry {:>3}: {} ms", attempt + 1, delay.as_millis());
    }
    Ok(())
}
