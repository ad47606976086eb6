#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Merge engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The crate also owns the persisted [`SessionRecord`] shape and the
//! [`SessionStore`] contract that every storage medium must honor.

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Grid Merge.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Shifts the player by the provided offset measured in degrees.
    MovePlayerBy {
        /// Offset applied to the player's latitude.
        delta_lat: f64,
        /// Offset applied to the player's longitude.
        delta_lng: f64,
    },
    /// Teleports the player to an absolute position, typically a geolocation fix.
    SetPlayerPosition {
        /// Position the player should occupy after the command.
        position: Position,
    },
    /// Requests a pickup, placement, or merge against the provided cell.
    Interact {
        /// Cell targeted by the player.
        cell: CellAddress,
    },
    /// Starts a new game, discarding every override and the held token.
    ResetSession,
    /// Replaces the session wholesale with the contents of a persisted record.
    RestoreSession {
        /// Record previously produced by the world.
        record: SessionRecord,
    },
    /// Raises the victory flag after a qualifying merge.
    DeclareVictory {
        /// Token value that satisfied the win threshold.
        value: Token,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the player moved between two positions.
    PlayerMoved {
        /// Position occupied before the move.
        from: Position,
        /// Position occupied after the move.
        to: Position,
    },
    /// Confirms that the player lifted a token out of a cell.
    TokenPickedUp {
        /// Cell that held the token and is now explicitly empty.
        cell: CellAddress,
        /// Value of the token now held by the player.
        value: Token,
    },
    /// Confirms that the held token was dropped into an empty cell.
    TokenPlaced {
        /// Cell that received the token.
        cell: CellAddress,
        /// Value of the placed token.
        value: Token,
    },
    /// Confirms that the held token merged with an equal token.
    TokensMerged {
        /// Cell that now holds the merged token.
        cell: CellAddress,
        /// Value produced by the merge.
        value: Token,
    },
    /// Reports that an interaction left the session untouched.
    InteractionRejected {
        /// Cell targeted by the rejected interaction.
        cell: CellAddress,
        /// Specific reason the interaction did nothing.
        reason: InteractionError,
    },
    /// Reports that a movement request was refused.
    MovementRejected {
        /// Specific reason the movement failed.
        reason: MovementError,
    },
    /// Announces that the session returned to its starting state.
    SessionReset,
    /// Announces that a persisted record replaced the session.
    SessionRestored {
        /// Number of overridden cells replayed from the record.
        cells: usize,
    },
    /// Reports that a persisted record was refused; a reset follows.
    SessionRestoreRejected {
        /// Specific reason the record was refused.
        reason: RestoreError,
    },
    /// Announces that the player reached the win threshold.
    VictoryDeclared {
        /// Token value that satisfied the threshold.
        value: Token,
    },
}

impl Event {
    /// Reports whether the event describes a change that must be persisted.
    #[must_use]
    pub const fn mutates_session(&self) -> bool {
        matches!(
            self,
            Self::PlayerMoved { .. }
                | Self::TokenPickedUp { .. }
                | Self::TokenPlaced { .. }
                | Self::TokensMerged { .. }
                | Self::SessionReset
                | Self::SessionRestored { .. }
        )
    }
}

/// Continuous player location expressed as latitude and longitude degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    lat: f64,
    lng: f64,
}

impl Position {
    /// Creates a new position from latitude and longitude degrees.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude component in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude component in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Reports whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Returns the position shifted by the provided offsets.
    #[must_use]
    pub fn offset(self, delta_lat: f64, delta_lng: f64) -> Self {
        Self::new(self.lat + delta_lat, self.lng + delta_lng)
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing latitude.
    North,
    /// Movement toward increasing longitude.
    East,
    /// Movement toward decreasing latitude.
    South,
    /// Movement toward decreasing longitude.
    West,
}

impl Direction {
    /// Offset in degrees produced by a single step of `step` degrees.
    #[must_use]
    pub fn offset(self, step: f64) -> (f64, f64) {
        match self {
            Self::North => (step, 0.0),
            Self::East => (0.0, step),
            Self::South => (-step, 0.0),
            Self::West => (0.0, -step),
        }
    }
}

/// Location of a single grid cell expressed as integer indices.
///
/// `i` indexes latitude bands and `j` indexes longitude bands. The grid is
/// unbounded in every direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    i: i32,
    j: i32,
}

impl CellAddress {
    /// Creates a new cell address.
    #[must_use]
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Latitude band index of the cell.
    #[must_use]
    pub const fn i(&self) -> i32 {
        self.i
    }

    /// Longitude band index of the cell.
    #[must_use]
    pub const fn j(&self) -> i32 {
        self.j
    }

    /// Maps a continuous position onto the cell that contains it.
    ///
    /// Each axis is floored independently, so cells are half-open on their
    /// upper edges. Non-finite positions are a caller contract violation.
    /// Use [`CellAddress::try_containing`] for positions that may lie beyond
    /// the indexable grid.
    #[must_use]
    pub fn containing(position: Position, tile_size: f64) -> Self {
        debug_assert!(position.is_finite(), "cell lookup requires a finite position");
        Self {
            i: (position.lat() / tile_size).floor() as i32,
            j: (position.lng() / tile_size).floor() as i32,
        }
    }

    /// Maps a position onto its cell, or `None` when the position is not
    /// finite or its indices do not fit the grid.
    #[must_use]
    pub fn try_containing(position: Position, tile_size: f64) -> Option<Self> {
        let indices = f64::from(i32::MIN)..=f64::from(i32::MAX);
        let i = (position.lat() / tile_size).floor();
        let j = (position.lng() / tile_size).floor();
        (indices.contains(&i) && indices.contains(&j)).then(|| Self {
            i: i as i32,
            j: j as i32,
        })
    }

    /// Canonical center point of the cell.
    #[must_use]
    pub fn center(self, tile_size: f64) -> Position {
        let half = tile_size / 2.0;
        Position::new(
            f64::from(self.i) * tile_size + half,
            f64::from(self.j) * tile_size + half,
        )
    }

    /// Returns the address displaced by the provided offsets.
    #[must_use]
    pub const fn offset(self, di: i32, dj: i32) -> Self {
        Self::new(self.i.saturating_add(di), self.j.saturating_add(dj))
    }

    /// Computes the Chebyshev distance between two cell addresses.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellAddress) -> u32 {
        self.i.abs_diff(other.i).max(self.j.abs_diff(other.j))
    }

    /// Canonical key used for hashing and persistence.
    #[must_use]
    pub fn key(self) -> CellKey {
        CellKey(format!("{},{}", self.i, self.j))
    }
}

/// Canonical string form of a [`CellAddress`].
///
/// Two addresses with equal indices always produce identical keys, which is
/// what makes generation and persisted lookups reproducible.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellKey(String);

impl CellKey {
    /// Borrows the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into the address it names.
    pub fn address(&self) -> Result<CellAddress, CellKeyError> {
        self.0.parse()
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CellAddress> for CellKey {
    fn from(address: CellAddress) -> Self {
        address.key()
    }
}

impl FromStr for CellAddress {
    type Err = CellKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || CellKeyError(value.to_owned());
        let (i, j) = value.split_once(',').ok_or_else(malformed)?;
        let i = i.parse::<i32>().map_err(|_| malformed())?;
        let j = j.parse::<i32>().map_err(|_| malformed())?;
        let address = Self::new(i, j);
        // Only the canonical spelling names an address.
        if address.key().as_str() != value {
            return Err(malformed());
        }
        Ok(address)
    }
}

/// Error raised when a cell key does not name a valid address.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cell key '{0}' is not of the form '<i>,<j>'")]
pub struct CellKeyError(String);

/// Positive integer value that can be picked up, placed, or merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(NonZeroU32);

impl Token {
    /// Smallest representable token.
    pub const MIN: Self = Self(NonZeroU32::MIN);

    /// Creates a token, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Retrieves the numeric value of the token.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    /// Value produced by merging two tokens of this value, if representable.
    #[must_use]
    pub fn doubled(self) -> Option<Self> {
        NonZeroU32::new(2)
            .and_then(|two| self.0.checked_mul(two))
            .map(Self)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tri-state content of a cell as seen by the override layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// No override exists; the generator decides the content.
    Unmodified,
    /// The cell was explicitly emptied and never regenerates.
    Empty,
    /// The cell explicitly holds the provided token.
    Holds(Token),
}

/// Reasons an interaction may leave the session untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionError {
    /// The target cell lies outside the player's interaction radius.
    OutOfRange,
    /// The player holds nothing and the cell is empty.
    NothingToPickUp,
    /// The held token differs from the token in the cell.
    IncompatibleMerge,
    /// Merging would exceed the largest representable token.
    ValueOverflow,
}

/// Reasons a movement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementError {
    /// The resulting position contained a NaN or infinite component.
    NonFiniteCoordinate,
    /// The resulting position lies beyond the indexable grid.
    OutsideGrid,
}

/// Reasons a persisted record may be refused during restore.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RestoreError {
    /// The stored player position was not finite.
    #[error("stored player position is not finite")]
    NonFinitePosition,
    /// The stored player position lies beyond the indexable grid.
    #[error("stored player position lies outside the grid")]
    PositionOutsideGrid,
    /// A stored cell key did not name a valid address.
    #[error(transparent)]
    InvalidCellKey(#[from] CellKeyError),
    /// The same cell appeared more than once.
    #[error("cell '{0}' appears more than once")]
    DuplicateCell(CellKey),
}

/// Marker serialized as the literal string `"empty"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyMarker {
    /// The only marker value.
    Empty,
}

/// Persisted state of an overridden cell: `"empty"` or a positive integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredCell {
    /// The cell was explicitly emptied.
    Empty(EmptyMarker),
    /// The cell holds the provided token.
    Holds(Token),
}

impl StoredCell {
    /// Explicitly empty cell.
    pub const EMPTY: Self = Self::Empty(EmptyMarker::Empty);

    /// Token stored in the cell, if any.
    #[must_use]
    pub const fn token(&self) -> Option<Token> {
        match self {
            Self::Empty(_) => None,
            Self::Holds(token) => Some(*token),
        }
    }
}

impl From<Option<Token>> for StoredCell {
    fn from(value: Option<Token>) -> Self {
        value.map_or(Self::EMPTY, Self::Holds)
    }
}

/// Complete persistable state of one play-through.
///
/// The generator is never persisted; it is a pure function of the cell
/// address and the world seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Latitude of the player in degrees.
    pub player_lat: f64,
    /// Longitude of the player in degrees.
    pub player_lng: f64,
    /// Token carried by the player, if any.
    #[serde(default)]
    pub held_token: Option<Token>,
    /// Every overridden cell in ascending address order.
    pub cells: Vec<(CellKey, StoredCell)>,
}

impl SessionRecord {
    /// Position of the player captured by the record.
    #[must_use]
    pub const fn player_position(&self) -> Position {
        Position::new(self.player_lat, self.player_lng)
    }
}

/// Read/write contract that every storage medium must honor.
pub trait SessionStore {
    /// Failure raised by the medium.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the stored record; `Ok(None)` means no session exists.
    fn load(&mut self) -> Result<Option<SessionRecord>, Self::Error>;

    /// Replaces the stored record.
    fn save(&mut self, record: &SessionRecord) -> Result<(), Self::Error>;

    /// Discards the stored record; clearing an empty store succeeds.
    fn clear(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::{CellAddress, CellKey, Position, SessionRecord, StoredCell, Token};

    const TILE: f64 = 1e-4;

    #[test]
    fn chebyshev_distance_matches_expectation() {
        let origin = CellAddress::new(1, 1);
        let destination = CellAddress::new(4, -1);
        assert_eq!(origin.chebyshev_distance(destination), 3);
        assert_eq!(destination.chebyshev_distance(origin), 3);
    }

    #[test]
    fn containing_floors_negative_coordinates() {
        let cell = CellAddress::containing(Position::new(-0.00005, 0.00015), TILE);
        assert_eq!(cell, CellAddress::new(-1, 1));
    }

    #[test]
    fn center_maps_back_to_the_same_cell() {
        for (i, j) in [(0, 0), (-1, -1), (369_979, -1_220_571), (-50, 7)] {
            let cell = CellAddress::new(i, j);
            assert_eq!(CellAddress::containing(cell.center(TILE), TILE), cell);
        }
    }

    #[test]
    fn equal_addresses_share_a_key() {
        let key = CellAddress::new(-3, 12).key();
        assert_eq!(key, CellAddress::new(-3, 12).key());
        assert_eq!(key.as_str(), "-3,12");
        assert_eq!(key.address(), Ok(CellAddress::new(-3, 12)));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for text in ["", "3", "a,b", "1,2,3", "1;2", "+1,2", "1,02", " 1,2", "-0,0"] {
            let key: CellKey = serde_json::from_str(&format!("\"{text}\"")).expect("string key");
            assert!(key.address().is_err(), "'{text}' should not parse");
        }
    }

    #[test]
    fn positions_beyond_the_grid_have_no_cell() {
        assert_eq!(
            CellAddress::try_containing(Position::new(-0.00005, 0.00015), TILE),
            Some(CellAddress::new(-1, 1))
        );
        assert_eq!(CellAddress::try_containing(Position::new(300_000.0, 0.0), TILE), None);
        assert_eq!(CellAddress::try_containing(Position::new(0.0, -300_000.0), TILE), None);
        assert_eq!(CellAddress::try_containing(Position::new(f64::NAN, 0.0), TILE), None);

        let edge = CellAddress::new(i32::MAX, i32::MIN);
        assert_eq!(CellAddress::try_containing(edge.center(TILE), TILE), Some(edge));
    }

    #[test]
    fn token_doubles_and_refuses_overflow() {
        let four = Token::new(4).expect("non-zero");
        assert_eq!(four.doubled(), Token::new(8));
        assert_eq!(Token::new(0), None);
        let huge = Token::new(1 << 31).expect("non-zero");
        assert_eq!(huge.doubled(), None);
    }

    #[test]
    fn session_record_uses_documented_json_shape() {
        let record = SessionRecord {
            player_lat: 1.5,
            player_lng: -2.25,
            held_token: Token::new(4),
            cells: vec![
                (CellAddress::new(0, 1).key(), StoredCell::EMPTY),
                (CellAddress::new(2, -3).key(), StoredCell::Holds(Token::new(8).expect("8"))),
            ],
        };

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "player_lat": 1.5,
                "player_lng": -2.25,
                "held_token": 4,
                "cells": [["0,1", "empty"], ["2,-3", 8]],
            })
        );

        let restored: SessionRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, record);
    }

    #[test]
    fn zero_tokens_are_malformed() {
        let json = r#"{"player_lat":0,"player_lng":0,"held_token":null,"cells":[["0,0",0]]}"#;
        assert!(serde_json::from_str::<SessionRecord>(json).is_err());
    }

    #[test]
    fn missing_held_token_reads_as_empty_hand() {
        let json = r#"{"player_lat":0,"player_lng":0,"cells":[]}"#;
        let record: SessionRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.held_token, None);
    }
}
