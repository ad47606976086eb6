#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Grid Merge experience.

use gridmerge_core::{Command, SessionStore};
use gridmerge_world::{query, World};
use tracing::{info, warn};

/// Produces the data and commands required to start a process.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Chooses the first command of the process from the stored session.
    ///
    /// A stored record is restored; no record, or a store that cannot be
    /// read, starts a new game.
    pub fn initial_command<S: SessionStore>(&self, store: &mut S) -> Command {
        match store.load() {
            Ok(Some(record)) => {
                info!(cells = record.cells.len(), "resuming stored session");
                Command::RestoreSession { record }
            }
            Ok(None) => {
                info!("no stored session; starting a new game");
                Command::ResetSession
            }
            Err(error) => {
                warn!(%error, "stored session unreadable; starting a new game");
                Command::ResetSession
            }
        }
    }
}
