//! Per-thread scope state for a retry handler.
//!
//! Each [`ScopeStateTracker`] has its own slot in a thread-local map, so two
//! handlers used on the same thread never see each other's flags and no
//! thread ever observes another thread's state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Retry state of one handler on one thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeState {
    /// A retry loop owned by this thread is in flight.
    pub active: bool,
    /// Some scope in the current attempt declared it must never be retried.
    pub poisoned: bool,
}

impl ScopeState {
    pub const CLEAN: ScopeState = ScopeState {
        active: false,
        poisoned: false,
    };

    pub fn is_clean(&self) -> bool {
        *self == Self::CLEAN
    }
}

static NEXT_TRACKER_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static STATES: RefCell<HashMap<u64, ScopeState>> = RefCell::new(HashMap::new());
}

/// Thread-confined state cell. Reads on a thread that never wrote return
/// [`ScopeState::CLEAN`]; writing the clean state frees the slot.
#[derive(Debug)]
pub struct ScopeStateTracker {
    id: u64,
}

impl ScopeStateTracker {
    pub fn new() -> Self {
        Self {
            id: NEXT_TRACKER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn read(&self) -> ScopeState {
        STATES.with(|states| {
            states
                .borrow()
                .get(&self.id)
                .copied()
                .unwrap_or_default()
        })
    }

    pub fn write(&self, state: ScopeState) {
        STATES.with(|states| {
            let mut states = states.borrow_mut();
            if state.is_clean() {
                states.remove(&self.id);
            } else {
                states.insert(self.id, state);
            }
        });
    }

    /// Mark the current attempt on this thread as never retryable.
    pub fn poison(&self) {
        let mut state = self.read();
        state.poisoned = true;
        self.write(state);
    }
}

impl Default for ScopeStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopeStateTracker {
    fn drop(&mut self) {
        // The thread-local may already be gone during thread teardown.
        let _ = STATES.try_with(|states| {
            if let Ok(mut states) = states.try_borrow_mut() {
                states.remove(&self.id);
            }
        });
    }
}
