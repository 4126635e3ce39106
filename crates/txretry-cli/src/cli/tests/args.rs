//! Tests for delays, simulate, config and the global overrides.

use super::{parse, parse_cli};
use crate::cli::{Cli, CliCommand, KindArg};
use clap::Parser;
use txretry_core::config::RetryConfig;
use txretry_core::ScopeKind;

#[test]
fn cli_parse_delays_defaults() {
    match parse(&["txretry", "delays"]) {
        CliCommand::Delays { attempts, seed } => {
            assert!(attempts.is_none());
            assert!(seed.is_none());
        }
        _ => panic!("expected Delays"),
    }
}

#[test]
fn cli_parse_delays_with_options() {
    match parse(&["txretry", "delays", "--attempts", "6", "--seed", "9"]) {
        CliCommand::Delays { attempts, seed } => {
            assert_eq!(attempts, Some(6));
            assert_eq!(seed, Some(9));
        }
        _ => panic!("expected Delays"),
    }
}

#[test]
fn cli_parse_simulate_defaults() {
    match parse(&["txretry", "simulate"]) {
        CliCommand::Simulate {
            conflicts,
            kind,
            nested,
            no_sleep,
        } => {
            assert_eq!(conflicts, 1);
            assert_eq!(kind, KindArg::Candidate);
            assert!(nested.is_none());
            assert!(!no_sleep);
        }
        _ => panic!("expected Simulate"),
    }
}

#[test]
fn cli_parse_simulate_nested_never() {
    match parse(&[
        "txretry",
        "simulate",
        "--conflicts",
        "3",
        "--kind",
        "not-retryable",
        "--nested",
        "never",
        "--no-sleep",
    ]) {
        CliCommand::Simulate {
            conflicts,
            kind,
            nested,
            no_sleep,
        } => {
            assert_eq!(conflicts, 3);
            assert_eq!(kind, KindArg::NotRetryable);
            assert_eq!(nested, Some(KindArg::Never));
            assert!(no_sleep);
        }
        _ => panic!("expected Simulate"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["txretry", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_rejects_unknown_kind() {
    assert!(Cli::try_parse_from(["txretry", "simulate", "--kind", "sometimes"]).is_err());
}

#[test]
fn kind_arg_maps_to_scope_kind() {
    assert_eq!(ScopeKind::from(KindArg::Candidate), ScopeKind::RetryRootCandidate);
    assert_eq!(ScopeKind::from(KindArg::NotRetryable), ScopeKind::NotRetryableHere);
    assert_eq!(ScopeKind::from(KindArg::Never), ScopeKind::MustNeverRetry);
}

#[test]
fn global_overrides_after_subcommand() {
    let cli = parse_cli(&[
        "txretry",
        "delays",
        "--max-retries",
        "7",
        "--min-delay-ms",
        "20",
        "--multiplier",
        "2.5",
    ]);
    let mut retry = RetryConfig::default();
    cli.apply_overrides(&mut retry);
    assert_eq!(retry.max_retries, 7);
    assert_eq!(retry.min_delay_ms, 20);
    assert!((retry.multiplier - 2.5).abs() < 1e-9);
}

#[test]
fn no_overrides_leave_config_untouched() {
    let cli = parse_cli(&["txretry", "config"]);
    let mut retry = RetryConfig::default();
    cli.apply_overrides(&mut retry);
    assert_eq!(retry, RetryConfig::default());
}
