#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Grid Merge over stdin and stdout.

mod config;
mod input;
mod render;
mod session;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use gridmerge_core::{Command, Event, SessionStore};
use gridmerge_storage::FileStore;
use gridmerge_system_bootstrap::Bootstrap;
use gridmerge_world::{query, World};
use tracing::info;

use crate::{
    config::Overrides,
    input::{Action, HELP},
    session::Session,
};

/// Location-gridded merge game played from the terminal.
#[derive(Parser, Debug)]
#[command(name = "gridmerge", version, about)]
struct Args {
    /// TOML file with grid settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session file to resume from and autosave to
    #[arg(long)]
    save: Option<PathBuf>,

    /// Seed for the procedural generator
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore any stored session and start over
    #[arg(long)]
    new_game: bool,
}

/// Entry point for the Grid Merge command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let settings = config::load(
        args.config.as_deref(),
        Overrides {
            seed: args.seed,
            save_path: args.save,
        },
    )?;
    let world = World::with_config(settings.grid).context("failed to create world")?;
    let mut store = FileStore::new(settings.save_path);
    info!(path = %store.path().display(), "using session file");

    let bootstrap = Bootstrap;
    println!("{}", bootstrap.welcome_banner(&world));
    let first = if args.new_game {
        store
            .clear()
            .context("failed to discard the stored session")?;
        Command::ResetSession
    } else {
        bootstrap.initial_command(&mut store)
    };

    let mut session = Session::new(world, store);
    report(&session.submit(first));
    println!("{}", render::neighborhood(session.world()));

    play(&mut session, io::stdin().lock())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn play<S, R>(session: &mut Session<S>, lines: R) -> Result<()>
where
    S: SessionStore,
    R: BufRead,
{
    prompt()?;
    for line in lines.lines() {
        let line = line.context("failed to read command")?;
        let action = match input::parse(&line) {
            Ok(action) => action,
            Err(error) => {
                println!("{error}");
                prompt()?;
                continue;
            }
        };

        let events = match action {
            Action::Step(direction) => session.step(direction),
            Action::Goto(position) => session.submit(Command::SetPlayerPosition { position }),
            Action::Tap { di, dj } => {
                let cell = query::player_cell(session.world()).offset(di, dj);
                session.submit(Command::Interact { cell })
            }
            Action::Reset => session.submit(Command::ResetSession),
            Action::Look => Vec::new(),
            Action::Help => {
                println!("{HELP}");
                prompt()?;
                continue;
            }
            Action::Quit => break,
        };

        report(&events);
        println!("{}", render::neighborhood(session.world()));
        prompt()?;
    }
    Ok(())
}

fn report(events: &[Event]) {
    for message in events.iter().filter_map(render::describe) {
        println!("{message}");
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridmerge_storage::MemoryStore;

    #[test]
    fn scripted_input_drives_the_session() {
        let world = World::new();
        let start = query::player_cell(&world);
        let mut session = Session::new(world, MemoryStore::new());

        let script = io::Cursor::new("n\nbogus\ne\nlook\nquit\nn\n");
        play(&mut session, script).expect("script runs");

        assert_eq!(query::player_cell(session.world()), start.offset(1, 1));
    }
}
