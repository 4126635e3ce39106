//! Config command: print the effective configuration.

use anyhow::Result;
use txretry_core::config::TxRetryConfig;

pub fn run_config(cfg: &TxRetryConfig) -> Result<()> {
    print!("{}", cfg.to_toml_string()?);
    Ok(())
}
