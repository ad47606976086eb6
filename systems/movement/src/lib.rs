#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement sources that translate player input into movement commands.
//!
//! The world never knows which source is active; it only receives
//! `MovePlayerBy` and `SetPlayerPosition` commands.

use std::{
    collections::VecDeque,
    sync::mpsc::{Receiver, TryRecvError},
};

use gridmerge_core::{Command, Direction, Position};
use tracing::{debug, info};

/// Capability shared by every movement source.
pub trait MovementController {
    /// Activates the source.
    fn start(&mut self);

    /// Deactivates the source and releases anything it holds.
    fn stop(&mut self);

    /// Reports whether the source is currently active.
    fn is_active(&self) -> bool;

    /// Emits a command for every movement gathered since the last poll.
    fn poll(&mut self, out: &mut Vec<Command>);
}

/// Movement driven by directional buttons.
///
/// Input is wired externally through [`ButtonMovement::press`]. Presses made
/// while the source is stopped are ignored, and stopping discards presses
/// that were not yet polled.
#[derive(Debug)]
pub struct ButtonMovement {
    step: f64,
    active: bool,
    pending: VecDeque<Direction>,
}

impl ButtonMovement {
    /// Creates a button source that moves `step` degrees per press.
    #[must_use]
    pub fn new(step: f64) -> Self {
        Self {
            step,
            active: false,
            pending: VecDeque::new(),
        }
    }

    /// Records a button press; ignored while the source is stopped.
    pub fn press(&mut self, direction: Direction) {
        if self.active {
            self.pending.push_back(direction);
        } else {
            debug!(?direction, "button press ignored while stopped");
        }
    }
}

impl MovementController for ButtonMovement {
    fn start(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
        self.pending.clear();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self, out: &mut Vec<Command>) {
        for direction in self.pending.drain(..) {
            let (delta_lat, delta_lng) = direction.offset(self.step);
            out.push(Command::MovePlayerBy {
                delta_lat,
                delta_lng,
            });
        }
    }
}

/// Provider of absolute position fixes, such as a device location service.
pub trait PositionSource {
    /// Opens a subscription; fixes arrive on the returned channel until it is dropped.
    fn watch(&mut self) -> Receiver<Position>;
}

/// Movement driven by absolute position fixes.
///
/// The subscription handle is owned while active and dropped on
/// [`MovementController::stop`], which disconnects the provider.
#[derive(Debug)]
pub struct GeolocationMovement<S> {
    source: S,
    subscription: Option<Receiver<Position>>,
}

impl<S: PositionSource> GeolocationMovement<S> {
    /// Creates an inactive geolocation source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            subscription: None,
        }
    }

    /// Borrows the underlying position provider.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}

impl<S: PositionSource> MovementController for GeolocationMovement<S> {
    fn start(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.source.watch());
            info!("geolocation tracking started");
        }
    }

    fn stop(&mut self) {
        if self.subscription.take().is_some() {
            info!("geolocation tracking stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    fn poll(&mut self, out: &mut Vec<Command>) {
        let Some(subscription) = &self.subscription else {
            return;
        };

        let disconnected = loop {
            match subscription.try_recv() {
                Ok(position) => out.push(Command::SetPlayerPosition { position }),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        if disconnected {
            debug!("position provider hung up");
            self.subscription = None;
        }
    }
}
