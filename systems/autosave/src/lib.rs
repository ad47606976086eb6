#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autosave system that writes the session after every mutating event.

use gridmerge_core::{Event, SessionRecord, SessionStore};
use tracing::{debug, warn};

/// Result of offering an event batch to the autosave system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No event in the batch changed the session.
    Skipped,
    /// The session was written to the store.
    Saved,
    /// The store refused the write; the session itself is unaffected.
    Failed,
}

/// System that persists the session immediately, without batching.
///
/// Writes are fire-and-forget: a failing store is logged and counted but
/// never rolls back or blocks the mutation that triggered it.
#[derive(Debug, Default)]
pub struct Autosave {
    saves: u64,
    failures: u64,
}

impl Autosave {
    /// Creates a new autosave system.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            saves: 0,
            failures: 0,
        }
    }

    /// Number of successful writes so far.
    #[must_use]
    pub const fn saves(&self) -> u64 {
        self.saves
    }

    /// Number of writes the store refused so far.
    #[must_use]
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    /// Persists the session if any event in the batch mutated it.
    ///
    /// `snapshot` is only invoked when a write is required and must capture
    /// the session after the events were applied.
    pub fn handle<S, F>(&mut self, events: &[Event], snapshot: F, store: &mut S) -> SaveOutcome
    where
        S: SessionStore,
        F: FnOnce() -> SessionRecord,
    {
        if !events.iter().any(Event::mutates_session) {
            return SaveOutcome::Skipped;
        }

        let record = snapshot();
        match store.save(&record) {
            Ok(()) => {
                self.saves += 1;
                debug!(cells = record.cells.len(), "session saved");
                SaveOutcome::Saved
            }
            Err(error) => {
                self.failures += 1;
                warn!(%error, "failed to save session");
                SaveOutcome::Failed
            }
        }
    }
}
