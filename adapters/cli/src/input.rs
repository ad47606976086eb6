//! Parsing of the line-oriented command language read from stdin.

use gridmerge_core::{Direction, Position};
use thiserror::Error;

/// Action requested by a single line of input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Action {
    /// Move one tile in a direction.
    Step(Direction),
    /// Jump to an absolute position.
    Goto(Position),
    /// Interact with the cell offset from the player's cell.
    Tap { di: i32, dj: i32 },
    /// Redraw without changing anything.
    Look,
    /// Start a new game.
    Reset,
    /// Print the command summary.
    Help,
    /// Leave the program.
    Quit,
}

/// Reasons a line could not be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ParseError {
    #[error("unknown command '{0}'; type 'help' for a list")]
    UnknownCommand(String),
    #[error("'{command}' expects {expected}")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
    },
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

pub(crate) const HELP: &str = "\
commands:
  n | s | e | w        move one tile north, south, east or west
  goto <lat> <lng>     jump to an absolute position
  tap <di> <dj>        pick up, place or merge at the cell offset from you
  look                 redraw the neighborhood
  reset                start a new game
  quit                 save and leave";

/// Parses one input line; blank lines read as [`Action::Look`].
pub(crate) fn parse(line: &str) -> Result<Action, ParseError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Action::Look);
    };
    let arguments: Vec<&str> = words.collect();

    let action = match command.to_ascii_lowercase().as_str() {
        "n" | "north" => Action::Step(Direction::North),
        "s" | "south" => Action::Step(Direction::South),
        "e" | "east" => Action::Step(Direction::East),
        "w" | "west" => Action::Step(Direction::West),
        "look" | "l" => Action::Look,
        "reset" => Action::Reset,
        "help" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        "goto" => {
            let [lat, lng] = two_arguments(&arguments, "goto", "<lat> <lng>")?;
            Action::Goto(Position::new(number(lat)?, number(lng)?))
        }
        "tap" | "t" => {
            let [di, dj] = two_arguments(&arguments, "tap", "<di> <dj>")?;
            Action::Tap {
                di: number(di)?,
                dj: number(dj)?,
            }
        }
        other => return Err(ParseError::UnknownCommand(other.to_owned())),
    };

    if !arguments.is_empty() && !matches!(action, Action::Goto(_) | Action::Tap { .. }) {
        return Err(ParseError::WrongArity {
            command: "this command",
            expected: "no arguments",
        });
    }
    Ok(action)
}

fn two_arguments<'a>(
    arguments: &[&'a str],
    command: &'static str,
    expected: &'static str,
) -> Result<[&'a str; 2], ParseError> {
    match arguments {
        [first, second] => Ok([first, second]),
        _ => Err(ParseError::WrongArity { command, expected }),
    }
}

fn number<T: std::str::FromStr>(text: &str) -> Result<T, ParseError> {
    text.parse()
        .map_err(|_| ParseError::InvalidNumber(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_accept_short_and_long_forms() {
        assert_eq!(parse("n"), Ok(Action::Step(Direction::North)));
        assert_eq!(parse("  EAST "), Ok(Action::Step(Direction::East)));
        assert_eq!(parse("w"), Ok(Action::Step(Direction::West)));
    }

    #[test]
    fn blank_line_redraws() {
        assert_eq!(parse("   "), Ok(Action::Look));
    }

    #[test]
    fn tap_reads_signed_offsets() {
        assert_eq!(parse("tap -1 2"), Ok(Action::Tap { di: -1, dj: 2 }));
    }

    #[test]
    fn goto_reads_coordinates() {
        assert_eq!(
            parse("goto 36.9979 -122.057"),
            Ok(Action::Goto(Position::new(36.9979, -122.057)))
        );
    }

    #[test]
    fn malformed_lines_are_reported() {
        assert_eq!(
            parse("jump"),
            Err(ParseError::UnknownCommand("jump".to_owned()))
        );
        assert_eq!(
            parse("tap 1"),
            Err(ParseError::WrongArity {
                command: "tap",
                expected: "<di> <dj>",
            })
        );
        assert_eq!(
            parse("tap one 2"),
            Err(ParseError::InvalidNumber("one".to_owned()))
        );
        assert!(parse("reset now").is_err());
    }
}
