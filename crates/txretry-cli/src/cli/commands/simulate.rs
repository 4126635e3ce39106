//! Simulate command: drive a conflicting unit of work through the handler.

use anyhow::Result;
use std::cell::Cell;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use txretry_core::classify::TransactionError;
use txretry_core::{RetryError, RetryHandler, RetryPolicy, ScopeKind};

pub struct SimulationReport {
    pub invocations: u32,
    pub delays: Vec<Duration>,
    pub outcome: Result<u32, RetryError<TransactionError>>,
}

/// The work fails with a serialization failure on its first `conflicts`
/// invocations and succeeds afterwards, returning its invocation number.
pub fn simulate_conflicts(
    policy: RetryPolicy,
    conflicts: u32,
    kind: ScopeKind,
    nested: Option<ScopeKind>,
    sleep: bool,
) -> SimulationReport {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&delays);
    let handler = RetryHandler::new(policy, TransactionError::is_retryable).with_sleeper(
        move |delay: Duration| {
            recorded
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(delay);
            if sleep {
                std::thread::sleep(delay);
            }
        },
    );

    let invocations = Cell::new(0u32);
    let work = || {
        let n = invocations.get() + 1;
        invocations.set(n);
        if n <= conflicts {
            Err(TransactionError::serialization_failure(format!(
                "could not serialize access (invocation {})",
                n
            )))
        } else {
            Ok(n)
        }
    };

    let outcome = handler.run(kind, || match nested {
        Some(inner) => handler.run(inner, &work).map_err(RetryError::into_inner),
        None => work(),
    });

    let delays = delays.lock().unwrap_or_else(|e| e.into_inner()).clone();
    SimulationReport {
        invocations: invocations.get(),
        delays,
        outcome,
    }
}

pub fn run_simulate(
    policy: RetryPolicy,
    conflicts: u32,
    kind: ScopeKind,
    nested: Option<ScopeKind>,
    sleep: bool,
) -> Result<()> {
    let report = simulate_conflicts(policy, conflicts, kind, nested, sleep);
    let delays: Vec<String> = report
        .delays
        .iter()
        .map(|d| format!("{}ms", d.as_millis()))
        .collect();
    println!("invocations: {}", report.invocations);
    println!("delays:      [{}]", delays.join(", "));
    match report.outcome {
        Ok(n) => println!("outcome:     committed on invocation {}", n),
        Err(err) => println!("outcome:     {}", err),
    }
    Ok(())
}
