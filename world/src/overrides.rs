//! Sparse record of player-caused divergence from generated content.

use std::collections::BTreeMap;

use gridmerge_core::{CellAddress, CellState, Token};

/// Override entries keyed by cell address.
///
/// Unmodified cells cost nothing and are regenerated on demand. A stored
/// `None` marks a cell that was explicitly emptied, which keeps a picked-up
/// baseline token from ever regenerating. Entries are only removed by
/// [`OverrideStore::clear`].
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct OverrideStore {
    entries: BTreeMap<CellAddress, Option<Token>>,
}

impl OverrideStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, cell: CellAddress) -> CellState {
        match self.entries.get(&cell) {
            None => CellState::Unmodified,
            Some(None) => CellState::Empty,
            Some(Some(token)) => CellState::Holds(*token),
        }
    }

    pub(crate) fn set_empty(&mut self, cell: CellAddress) {
        let _ = self.entries.insert(cell, None);
    }

    pub(crate) fn set_token(&mut self, cell: CellAddress, token: Token) {
        let _ = self.entries.insert(cell, Some(token));
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Every entry in ascending address order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (CellAddress, Option<Token>)> + '_ {
        self.entries.iter().map(|(cell, state)| (*cell, *state))
    }
}
