//! Deterministic procedural content for cells that carry no override.

use gridmerge_core::{CellAddress, CellKey, Token};
use sha2::{Digest, Sha256};

const STREAM_PRESENCE: &str = "presence";
const STREAM_VALUE: &str = "value";

/// Pure generator mapping a cell address to its baseline token.
///
/// Two independently keyed draws are taken per cell: the first decides
/// whether a token exists at all, the second selects its value from the
/// configured seed set. Nothing is cached, so every call recomputes from the
/// cell key and the world seed alone.
#[derive(Clone, Debug)]
pub(crate) struct Generator {
    seed: u64,
    spawn_probability: f64,
    seed_values: Vec<Token>,
}

impl Generator {
    pub(crate) fn new(seed: u64, spawn_probability: f64, seed_values: Vec<Token>) -> Self {
        Self {
            seed,
            spawn_probability,
            seed_values,
        }
    }

    /// Baseline token for the cell, or `None` when the cell spawns empty.
    pub(crate) fn generate(&self, cell: CellAddress) -> Option<Token> {
        let key = cell.key();
        if luck(&key, self.seed, STREAM_PRESENCE) >= self.spawn_probability {
            return None;
        }

        let draw = luck(&key, self.seed, STREAM_VALUE);
        let index = (draw * self.seed_values.len() as f64).floor() as usize;
        self.seed_values
            .get(index.min(self.seed_values.len().saturating_sub(1)))
            .copied()
    }
}

/// Reproducible pseudo-random real in `[0, 1)` derived from the cell key.
pub(crate) fn luck(key: &CellKey, seed: u64, stream: &str) -> f64 {
    const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);

    let mut hasher = Sha256::new();
    hasher.update(key.as_str().as_bytes());
    hasher.update(seed.to_le_bytes());
    hasher.update(stream.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    let value = u64::from_le_bytes(bytes) >> 11;
    (value as f64) * SCALE
}
