//! Conversion between the live session and its persisted record.

use gridmerge_core::{
    CellAddress, CellState, Position, RestoreError, SessionRecord, StoredCell, Token,
};

use crate::{overrides::OverrideStore, World};

/// Session contents decoded from a record that passed validation.
#[derive(Debug)]
pub(crate) struct DecodedSession {
    pub(crate) position: Position,
    pub(crate) held: Option<Token>,
    pub(crate) overrides: OverrideStore,
}

/// Captures the persistable state of the world.
pub(crate) fn snapshot(world: &World) -> SessionRecord {
    SessionRecord {
        player_lat: world.position.lat(),
        player_lng: world.position.lng(),
        held_token: world.held,
        cells: world
            .overrides
            .iter()
            .map(|(cell, state)| (cell.key(), StoredCell::from(state)))
            .collect(),
    }
}

/// Decodes a record in full before anything is applied to the world.
pub(crate) fn decode(
    record: &SessionRecord,
    tile_size: f64,
) -> Result<DecodedSession, RestoreError> {
    let position = record.player_position();
    if !position.is_finite() {
        return Err(RestoreError::NonFinitePosition);
    }
    if CellAddress::try_containing(position, tile_size).is_none() {
        return Err(RestoreError::PositionOutsideGrid);
    }

    let mut overrides = OverrideStore::new();
    for (key, stored) in &record.cells {
        let cell = key.address()?;
        if overrides.get(cell) != CellState::Unmodified {
            return Err(RestoreError::DuplicateCell(key.clone()));
        }
        match stored.token() {
            Some(token) => overrides.set_token(cell, token),
            None => overrides.set_empty(cell),
        }
    }

    Ok(DecodedSession {
        position,
        held: record.held_token,
        overrides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmerge_core::CellKey;

    const TILE: f64 = 1e-4;

    fn key(text: &str) -> CellKey {
        serde_json::from_value(serde_json::json!(text)).expect("string key")
    }

    fn record(cells: Vec<(CellKey, StoredCell)>) -> SessionRecord {
        SessionRecord {
            player_lat: 1.0,
            player_lng: 2.0,
            held_token: Token::new(2),
            cells,
        }
    }

    #[test]
    fn decode_replays_every_cell() {
        let decoded = decode(&record(vec![
            (key("0,0"), StoredCell::EMPTY),
            (key("-4,9"), StoredCell::Holds(Token::new(16).expect("16"))),
        ]), TILE)
        .expect("valid record");

        assert_eq!(decoded.position, Position::new(1.0, 2.0));
        assert_eq!(decoded.held, Token::new(2));
        assert_eq!(decoded.overrides.get(CellAddress::new(0, 0)), CellState::Empty);
        assert_eq!(
            decoded.overrides.get(CellAddress::new(-4, 9)),
            CellState::Holds(Token::new(16).expect("16"))
        );
    }

    #[test]
    fn decode_rejects_unparseable_keys() {
        let result = decode(&record(vec![(key("north"), StoredCell::EMPTY)]), TILE);
        assert!(matches!(result, Err(RestoreError::InvalidCellKey(_))));
    }

    #[test]
    fn decode_rejects_duplicate_cells() {
        let result = decode(&record(vec![
            (key("1,1"), StoredCell::EMPTY),
            (key("1,1"), StoredCell::Holds(Token::new(2).expect("2"))),
        ]), TILE);
        assert_eq!(result.err(), Some(RestoreError::DuplicateCell(key("1,1"))));
    }

    #[test]
    fn decode_rejects_non_finite_positions() {
        let mut invalid = record(Vec::new());
        invalid.player_lat = f64::NAN;
        assert_eq!(decode(&invalid, TILE).err(), Some(RestoreError::NonFinitePosition));
    }

    #[test]
    fn decode_rejects_positions_beyond_the_grid() {
        let mut invalid = record(Vec::new());
        invalid.player_lng = -400_000.0;
        assert_eq!(
            decode(&invalid, TILE).err(),
            Some(RestoreError::PositionOutsideGrid)
        );
    }
}
