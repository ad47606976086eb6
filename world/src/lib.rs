#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Grid Merge.
//!
//! The world owns the player position, the held token, and the override
//! store. Every mutation flows through [`apply`]; every read flows through
//! the [`query`] module, whose [`query::resolve`] is the single authority on
//! what a cell contains.

mod generation;
mod interaction;
mod overrides;
mod persistence;

use gridmerge_core::{
    CellAddress, Command, Event, InteractionError, MovementError, Position, Token, WELCOME_BANNER,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    generation::Generator,
    interaction::Transition,
    overrides::OverrideStore,
};

/// Side length of a cell in degrees.
pub const DEFAULT_TILE_SIZE: f64 = 1e-4;
/// Seed feeding the procedural generator.
pub const DEFAULT_SEED: u64 = 0x1d4f_8c2b_77a0_93e5;
/// Probability that an unmodified cell spawns a token.
pub const DEFAULT_SPAWN_PROBABILITY: f64 = 0.1;
/// Values a freshly generated token may take.
pub const DEFAULT_SEED_VALUES: [u32; 2] = [2, 4];
/// Chebyshev distance, in cells, within which the player may interact.
pub const DEFAULT_INTERACTION_RADIUS: u32 = 3;
/// Largest accepted interaction radius, in cells.
pub const MAX_INTERACTION_RADIUS: u32 = 64;
/// Merge result that wins the game.
pub const DEFAULT_WIN_THRESHOLD: u32 = 32;
/// Starting latitude of a new game.
pub const DEFAULT_START_LAT: f64 = 36.997_936_938_057_016;
/// Starting longitude of a new game.
pub const DEFAULT_START_LNG: f64 = -122.057_035_075_011_51;

/// Tunable parameters of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Side length of a square cell in degrees.
    pub tile_size: f64,
    /// Seed feeding the procedural generator.
    pub seed: u64,
    /// Probability in `[0, 1]` that an unmodified cell spawns a token.
    pub spawn_probability: f64,
    /// Values a freshly generated token may take.
    pub seed_values: Vec<Token>,
    /// Chebyshev distance, in cells, within which the player may interact.
    pub interaction_radius: u32,
    /// Merge result that wins the game.
    pub win_threshold: Token,
    /// Player position at the start of a new game.
    pub start: Position,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            seed: DEFAULT_SEED,
            spawn_probability: DEFAULT_SPAWN_PROBABILITY,
            seed_values: DEFAULT_SEED_VALUES
                .into_iter()
                .filter_map(Token::new)
                .collect(),
            interaction_radius: DEFAULT_INTERACTION_RADIUS,
            win_threshold: Token::new(DEFAULT_WIN_THRESHOLD).unwrap_or(Token::MIN),
            start: Position::new(DEFAULT_START_LAT, DEFAULT_START_LNG),
        }
    }
}

impl GridConfig {
    /// Checks that every parameter describes a playable grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(ConfigError::InvalidSpawnProbability(self.spawn_probability));
        }
        if self.seed_values.is_empty() {
            return Err(ConfigError::EmptySeedValues);
        }
        if self.interaction_radius > MAX_INTERACTION_RADIUS {
            return Err(ConfigError::InvalidInteractionRadius(self.interaction_radius));
        }
        if !self.start.is_finite() {
            return Err(ConfigError::NonFiniteStart);
        }
        if CellAddress::try_containing(self.start, self.tile_size).is_none() {
            return Err(ConfigError::StartOutsideGrid);
        }
        Ok(())
    }
}

/// Reasons a [`GridConfig`] cannot drive a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Cells must have a positive, finite size.
    #[error("tile size {0} must be positive and finite")]
    InvalidTileSize(f64),
    /// Spawn probability lies outside `[0, 1]`.
    #[error("spawn probability {0} must lie within [0, 1]")]
    InvalidSpawnProbability(f64),
    /// Generation needs at least one value to choose from.
    #[error("at least one seed value is required")]
    EmptySeedValues,
    /// The interaction window would be too large to enumerate.
    #[error("interaction radius {0} exceeds the maximum of {MAX_INTERACTION_RADIUS}")]
    InvalidInteractionRadius(u32),
    /// The start position contained a NaN or infinite component.
    #[error("start position must be finite")]
    NonFiniteStart,
    /// The start position lies beyond the indexable grid.
    #[error("start position lies outside the grid")]
    StartOutsideGrid,
}

/// Represents the authoritative Grid Merge session state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GridConfig,
    generator: Generator,
    overrides: OverrideStore,
    position: Position,
    held: Option<Token>,
    victory: Option<Token>,
}

impl World {
    /// Creates a new game using the reference configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(GridConfig::default())
    }

    /// Creates a new game using the provided configuration.
    pub fn with_config(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: GridConfig) -> Self {
        let generator = Generator::new(
            config.seed,
            config.spawn_probability,
            config.seed_values.clone(),
        );
        Self {
            banner: WELCOME_BANNER,
            position: config.start,
            generator,
            overrides: OverrideStore::new(),
            held: None,
            victory: None,
            config,
        }
    }

    fn reset(&mut self) {
        self.overrides.clear();
        self.held = None;
        self.victory = None;
        self.position = self.config.start;
    }

    fn move_player(&mut self, destination: Position, out_events: &mut Vec<Event>) {
        if CellAddress::try_containing(destination, self.config.tile_size).is_none() {
            let reason = if destination.is_finite() {
                MovementError::OutsideGrid
            } else {
                MovementError::NonFiniteCoordinate
            };
            out_events.push(Event::MovementRejected { reason });
            return;
        }

        let from = self.position;
        self.position = destination;
        out_events.push(Event::PlayerMoved {
            from,
            to: destination,
        });
    }

    fn interact(&mut self, cell: CellAddress, out_events: &mut Vec<Event>) {
        if !query::is_in_range(self, cell, self.position) {
            out_events.push(Event::InteractionRejected {
                cell,
                reason: InteractionError::OutOfRange,
            });
            return;
        }

        let resolved = query::resolve(self, cell);
        let transition = match interaction::plan(self.held, resolved) {
            Ok(transition) => transition,
            Err(reason) => {
                debug!(?cell, ?reason, "interaction rejected");
                out_events.push(Event::InteractionRejected { cell, reason });
                return;
            }
        };

        match transition {
            Transition::PickUp(value) => {
                self.overrides.set_empty(cell);
                self.held = Some(value);
                out_events.push(Event::TokenPickedUp { cell, value });
            }
            Transition::Place(value) => {
                self.overrides.set_token(cell, value);
                self.held = None;
                out_events.push(Event::TokenPlaced { cell, value });
            }
            Transition::Merge(value) => {
                self.overrides.set_token(cell, value);
                self.held = None;
                out_events.push(Event::TokensMerged { cell, value });
            }
        }
        debug!(?cell, ?transition, "interaction applied");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::MovePlayerBy {
            delta_lat,
            delta_lng,
        } => {
            let destination = world.position.offset(delta_lat, delta_lng);
            world.move_player(destination, out_events);
        }
        Command::SetPlayerPosition { position } => world.move_player(position, out_events),
        Command::Interact { cell } => world.interact(cell, out_events),
        Command::ResetSession => {
            world.reset();
            info!("session reset");
            out_events.push(Event::SessionReset);
        }
        Command::RestoreSession { record } => match persistence::decode(
            &record,
            world.config.tile_size,
        ) {
            Ok(decoded) => {
                let cells = decoded.overrides.len();
                world.position = decoded.position;
                world.held = decoded.held;
                world.overrides = decoded.overrides;
                world.victory = None;
                info!(cells, "session restored");
                out_events.push(Event::SessionRestored { cells });
            }
            Err(reason) => {
                warn!(%reason, "stored session rejected; starting a new game");
                out_events.push(Event::SessionRestoreRejected { reason });
                world.reset();
                out_events.push(Event::SessionReset);
            }
        },
        Command::DeclareVictory { value } => {
            if world.victory.is_none() && value >= world.config.win_threshold {
                world.victory = Some(value);
                info!(%value, "victory declared");
                out_events.push(Event::VictoryDeclared { value });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridmerge_core::{CellAddress, CellState, Position, SessionRecord, Token};

    use super::{persistence, GridConfig, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the session configuration.
    #[must_use]
    pub fn config(world: &World) -> &GridConfig {
        &world.config
    }

    /// Authoritative content of a cell.
    ///
    /// An override, once present, is returned verbatim and the generator is
    /// never consulted for that cell again.
    #[must_use]
    pub fn resolve(world: &World, cell: CellAddress) -> Option<Token> {
        match world.overrides.get(cell) {
            CellState::Unmodified => world.generator.generate(cell),
            CellState::Empty => None,
            CellState::Holds(token) => Some(token),
        }
    }

    /// Override layer state of a cell, ignoring generated content.
    #[must_use]
    pub fn cell_state(world: &World, cell: CellAddress) -> CellState {
        world.overrides.get(cell)
    }

    /// Number of cells that diverge from generated content.
    #[must_use]
    pub fn override_count(world: &World) -> usize {
        world.overrides.len()
    }

    /// Reports whether a player at `position` may interact with `cell`.
    #[must_use]
    pub fn is_in_range(world: &World, cell: CellAddress, position: Position) -> bool {
        let origin = CellAddress::containing(position, world.config.tile_size);
        origin.chebyshev_distance(cell) <= world.config.interaction_radius
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.position
    }

    /// Cell containing the player.
    #[must_use]
    pub fn player_cell(world: &World) -> CellAddress {
        CellAddress::containing(world.position, world.config.tile_size)
    }

    /// Token carried by the player, if any.
    #[must_use]
    pub fn held_token(world: &World) -> Option<Token> {
        world.held
    }

    /// Reports whether victory was declared since the last reset.
    #[must_use]
    pub fn has_won(world: &World) -> bool {
        world.victory.is_some()
    }

    /// Token value that won the game, if victory was declared.
    #[must_use]
    pub fn winning_value(world: &World) -> Option<Token> {
        world.victory
    }

    /// Every cell within interaction range with its resolved content.
    ///
    /// Cells are ordered by ascending `i`, then ascending `j`.
    #[must_use]
    pub fn interactive_cells(world: &World) -> Vec<(CellAddress, Option<Token>)> {
        let origin = player_cell(world);
        let radius = i32::try_from(world.config.interaction_radius).unwrap_or(i32::MAX);
        let mut cells = Vec::new();
        for di in -radius..=radius {
            for dj in -radius..=radius {
                let cell = origin.offset(di, dj);
                cells.push((cell, resolve(world, cell)));
            }
        }
        cells
    }

    /// Captures the complete persistable state of the session.
    #[must_use]
    pub fn session_record(world: &World) -> SessionRecord {
        persistence::snapshot(world)
    }
}
