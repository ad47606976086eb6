#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure win detection system that turns qualifying merges into a victory.

use gridmerge_core::{Command, Event, Token};

/// Reports whether a merge result reaches the win threshold.
#[must_use]
pub fn check_win(value: Token, threshold: Token) -> bool {
    value >= threshold
}

/// System that declares victory once per game.
///
/// Victory is a one-way flag: after it fires, further merges are ignored
/// until a [`Event::SessionReset`] or [`Event::SessionRestored`] re-arms the
/// detector.
#[derive(Debug, Clone)]
pub struct WinDetection {
    threshold: Token,
    armed: bool,
}

impl WinDetection {
    /// Creates a detector that fires for merges of at least `threshold`.
    #[must_use]
    pub const fn new(threshold: Token) -> Self {
        Self {
            threshold,
            armed: true,
        }
    }

    /// Reports whether the detector can still fire.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consumes world events and emits at most one victory command.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::SessionReset | Event::SessionRestored { .. } => self.armed = true,
                Event::VictoryDeclared { .. } => self.armed = false,
                Event::TokensMerged { value, .. } => {
                    if self.armed && check_win(*value, self.threshold) {
                        self.armed = false;
                        out.push(Command::DeclareVictory { value: *value });
                    }
                }
                _ => {}
            }
        }
    }
}
