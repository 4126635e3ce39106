//! CLI command handlers, one per file.

mod config;
mod delays;
mod simulate;

pub use config::run_config;
pub use delays::run_delays;
pub use simulate::run_simulate;
#[cfg(test)]
pub use delays::delay_schedule;
#[cfg(test)]
pub use simulate::simulate_conflicts;
