//! CLI for the txretry retry engine.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use txretry_core::config::{self, RetryConfig};
use txretry_core::ScopeKind;

use commands::{run_config, run_delays, run_simulate};

/// Top-level CLI for txretry.
#[derive(Debug, Parser)]
#[command(name = "txretry")]
#[command(about = "txretry: nested-scope retry for transient transaction conflicts", long_about = None)]
pub struct Cli {
    /// Override retry.max_retries from config.toml.
    #[arg(long, global = true, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Override retry.min_delay_ms from config.toml.
    #[arg(long, global = true, value_name = "MS")]
    pub min_delay_ms: Option<u64>,

    /// Override retry.multiplier from config.toml.
    #[arg(long, global = true, value_name = "FACTOR")]
    pub multiplier: Option<f64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the backoff delay before each retry.
    Delays {
        /// Number of retries to show (default: max_retries).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
        /// Seed the jitter for a reproducible schedule.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a unit of work that hits serialization conflicts through the handler.
    Simulate {
        /// Number of leading invocations that fail with SQLSTATE 40001.
        #[arg(long, default_value = "1", value_name = "N")]
        conflicts: u32,
        /// Scope kind of the outer unit of work.
        #[arg(long, value_enum, default_value_t = KindArg::Candidate)]
        kind: KindArg,
        /// Run the conflicting work inside a nested scope of this kind.
        #[arg(long, value_enum)]
        nested: Option<KindArg>,
        /// Record backoff delays without actually sleeping.
        #[arg(long)]
        no_sleep: bool,
    },

    /// Print the effective configuration as TOML.
    Config,
}

/// Scope kind as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Candidate,
    NotRetryable,
    Never,
}

impl From<KindArg> for ScopeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Candidate => ScopeKind::RetryRootCandidate,
            KindArg::NotRetryable => ScopeKind::NotRetryableHere,
            KindArg::Never => ScopeKind::MustNeverRetry,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the loaded `[retry]` section.
    pub fn apply_overrides(&self, retry: &mut RetryConfig) {
        if let Some(n) = self.max_retries {
            retry.max_retries = n;
        }
        if let Some(ms) = self.min_delay_ms {
            retry.min_delay_ms = ms;
        }
        if let Some(m) = self.multiplier {
            retry.multiplier = m;
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        cli.apply_overrides(&mut cfg.retry);
        tracing::debug!("effective config: {:?}", cfg);
        let policy = cfg.retry.to_policy()?;

        match cli.command {
            CliCommand::Delays { attempts, seed } => run_delays(&policy, attempts, seed)?,
            CliCommand::Simulate {
                conflicts,
                kind,
                nested,
                no_sleep,
            } => run_simulate(policy, conflicts, kind.into(), nested.map(Into::into), !no_sleep)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
