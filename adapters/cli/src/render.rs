//! Text rendering of the neighborhood around the player.

use std::fmt::Write as _;

use gridmerge_core::{Event, InteractionError, Token};
use gridmerge_world::{query, World};

const CELL_WIDTH: usize = 6;

/// Draws the interaction neighborhood with north at the top.
///
/// Rows run from the highest `i` down, columns from the lowest `j` up. The
/// player's cell is bracketed and empty cells show as dots.
pub(crate) fn neighborhood(world: &World) -> String {
    let cells = query::interactive_cells(world);
    let player = query::player_cell(world);
    let width = (query::config(world).interaction_radius as usize) * 2 + 1;

    let mut out = String::new();
    for row in cells.chunks(width).rev() {
        for (cell, token) in row {
            let content = token.map_or_else(|| ".".to_owned(), |token| token.to_string());
            let label = if *cell == player {
                format!("[{content}]")
            } else {
                content
            };
            let _ = write!(out, "{label:^CELL_WIDTH$}");
        }
        out.push('\n');
    }

    out.push_str(&status(query::held_token(world), query::winning_value(world)));
    out
}

fn status(held: Option<Token>, victory: Option<Token>) -> String {
    let mut line = match held {
        Some(token) => format!("holding {token}"),
        None => "hand empty".to_owned(),
    };
    if let Some(value) = victory {
        let _ = write!(line, "  *** you won with {value} ***");
    }
    line
}

/// Describes an event for the player, or `None` for events that the grid
/// redraw already conveys.
pub(crate) fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::TokenPickedUp { cell, value } => format!("picked up {value} from {}", cell.key()),
        Event::TokenPlaced { cell, value } => format!("placed {value} on {}", cell.key()),
        Event::TokensMerged { cell, value } => format!("merged into {value} on {}", cell.key()),
        Event::InteractionRejected { cell, reason } => {
            format!("cannot interact with {}: {}", cell.key(), rejection(*reason))
        }
        Event::MovementRejected { .. } => "that position is not on the map".to_owned(),
        Event::SessionReset => "new game started".to_owned(),
        Event::SessionRestored { cells } => format!("session resumed ({cells} changed cells)"),
        Event::SessionRestoreRejected { reason } => {
            format!("stored session discarded: {reason}")
        }
        Event::VictoryDeclared { value } => format!("victory! you made {value}"),
        Event::PlayerMoved { .. } => return None,
    };
    Some(text)
}

fn rejection(reason: InteractionError) -> &'static str {
    match reason {
        InteractionError::OutOfRange => "too far away",
        InteractionError::NothingToPickUp => "nothing there to pick up",
        InteractionError::IncompatibleMerge => "values differ",
        InteractionError::ValueOverflow => "value too large",
    }
}
