use std::{fmt, io};

use gridmerge_core::{CellAddress, Command, Event, SessionRecord, SessionStore};
use gridmerge_storage::MemoryStore;
use gridmerge_system_autosave::{Autosave, SaveOutcome};
use gridmerge_world::{self as world, query, World};

#[derive(Debug, Default)]
struct RefusingStore {
    attempts: usize,
}

#[derive(Debug)]
struct Refused(io::Error);

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store refused write: {}", self.0)
    }
}

impl std::error::Error for Refused {}

impl SessionStore for RefusingStore {
    type Error = Refused;

    fn load(&mut self) -> Result<Option<SessionRecord>, Self::Error> {
        Ok(None)
    }

    fn save(&mut self, _record: &SessionRecord) -> Result<(), Self::Error> {
        self.attempts += 1;
        Err(Refused(io::Error::new(io::ErrorKind::Other, "disk full")))
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn step(
    world: &mut World,
    autosave: &mut Autosave,
    store: &mut impl SessionStore,
    command: Command,
) -> (Vec<Event>, SaveOutcome) {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    let outcome = autosave.handle(&events, || query::session_record(world), store);
    (events, outcome)
}

#[test]
fn movement_is_saved_immediately() {
    let mut world = World::new();
    let mut autosave = Autosave::new();
    let mut store = MemoryStore::new();

    let (_, outcome) = step(
        &mut world,
        &mut autosave,
        &mut store,
        Command::MovePlayerBy {
            delta_lat: 0.0001,
            delta_lng: 0.0,
        },
    );

    assert_eq!(outcome, SaveOutcome::Saved);
    let stored = store.load().expect("load").expect("record present");
    assert_eq!(stored, query::session_record(&world));
    assert_eq!(stored.player_position(), query::player_position(&world));
}

#[test]
fn rejected_interactions_are_not_saved() {
    let mut world = World::new();
    let mut autosave = Autosave::new();
    let mut store = MemoryStore::new();
    let far_away = query::player_cell(&world).offset(100, 100);

    let (events, outcome) = step(
        &mut world,
        &mut autosave,
        &mut store,
        Command::Interact { cell: far_away },
    );

    assert!(matches!(
        events.as_slice(),
        [Event::InteractionRejected { .. }]
    ));
    assert_eq!(outcome, SaveOutcome::Skipped);
    assert!(store.json().is_none());
    assert_eq!(autosave.saves(), 0);
}

#[test]
fn every_mutation_produces_its_own_write() {
    let mut world = World::new();
    let mut autosave = Autosave::new();
    let mut store = MemoryStore::new();
    let start = query::player_cell(&world);

    for _ in 0..3 {
        let _ = step(
            &mut world,
            &mut autosave,
            &mut store,
            Command::MovePlayerBy {
                delta_lat: 0.0,
                delta_lng: 0.0001,
            },
        );
    }
    let _ = step(&mut world, &mut autosave, &mut store, Command::ResetSession);

    assert_eq!(autosave.saves(), 4);
    let stored = store.load().expect("load").expect("record present");
    assert_eq!(
        CellAddress::containing(stored.player_position(), query::config(&world).tile_size),
        start
    );
}

#[test]
fn failing_store_does_not_block_the_session() {
    let mut world = World::new();
    let mut autosave = Autosave::new();
    let mut store = RefusingStore::default();
    let before = query::player_position(&world);

    let (events, outcome) = step(
        &mut world,
        &mut autosave,
        &mut store,
        Command::MovePlayerBy {
            delta_lat: 0.0002,
            delta_lng: 0.0,
        },
    );

    assert_eq!(outcome, SaveOutcome::Failed);
    assert_eq!(store.attempts, 1);
    assert_eq!(autosave.failures(), 1);
    assert!(matches!(events.as_slice(), [Event::PlayerMoved { .. }]));
    assert_ne!(query::player_position(&world), before);
}
