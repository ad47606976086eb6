//! Wiring of the world with the systems that react to its events.

use gridmerge_core::{Command, Direction, Event, SessionStore};
use gridmerge_system_autosave::Autosave;
use gridmerge_system_movement::{ButtonMovement, MovementController};
use gridmerge_system_win_detection::WinDetection;
use gridmerge_world::{self as world, query, World};

/// A running game: the world plus every system that observes it.
#[derive(Debug)]
pub(crate) struct Session<S> {
    world: World,
    store: S,
    autosave: Autosave,
    detection: WinDetection,
    buttons: ButtonMovement,
}

impl<S: SessionStore> Session<S> {
    pub(crate) fn new(world: World, store: S) -> Self {
        let config = query::config(&world);
        let detection = WinDetection::new(config.win_threshold);
        let mut buttons = ButtonMovement::new(config.tile_size);
        buttons.start();
        Self {
            world,
            store,
            autosave: Autosave::new(),
            detection,
            buttons,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Moves the player one tile through the button controller.
    pub(crate) fn step(&mut self, direction: Direction) -> Vec<Event> {
        self.buttons.press(direction);
        let mut commands = Vec::new();
        self.buttons.poll(&mut commands);
        self.run(commands)
    }

    /// Applies a command and every command the systems issue in response.
    pub(crate) fn submit(&mut self, command: Command) -> Vec<Event> {
        self.run(vec![command])
    }

    fn run(&mut self, mut pending: Vec<Command>) -> Vec<Event> {
        let mut observed = Vec::new();
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            self.detection.handle(&events, &mut pending);
            let world = &self.world;
            let _ = self
                .autosave
                .handle(&events, || query::session_record(world), &mut self.store);
            observed.extend(events);
        }
        observed
    }
}
