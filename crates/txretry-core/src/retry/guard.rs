//! RAII guard that hands the thread's scope state back when the loop owner exits.

use super::state::{ScopeState, ScopeStateTracker};

/// Writes `restore` to the tracker when dropped, including on unwind.
pub(super) struct RestoreGuard<'a> {
    pub(super) tracker: &'a ScopeStateTracker,
    pub(super) restore: ScopeState,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        self.tracker.write(self.restore);
    }
}
