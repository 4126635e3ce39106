//! Blocking sleep used between attempts.

use std::time::Duration;

/// Blocks the calling thread for the backoff delay.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration);
}

impl<F> Sleeper for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn sleep(&self, delay: Duration) {
        self(delay)
    }
}

/// `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}
