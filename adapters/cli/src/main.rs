#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Skirmish mission headlessly.
//!
//! Every actor is driven by the autopilot: player-controlled actors receive
//! its suggestions through the command interface, adversaries play their
//! turns inside `update`.

mod loading;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::{Command, Event};
use skirmish_session::{Session, SessionConfig};
use skirmish_system_dice::{Dice, Roll};
use skirmish_world::query;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Headless Skirmish runner.
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Play a Skirmish mission with every actor on autopilot")]
struct Args {
    /// JSON content pack holding terrain, abilities, items, entities and maps.
    content: PathBuf,

    /// Map to play; defaults to the first map by identifier.
    #[arg(long)]
    map: Option<String>,

    /// Seed for the action point, dodge and damage dice.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// TOML file overriding the session rule constants.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation updates to run before giving up.
    #[arg(long, default_value_t = 500)]
    max_updates: usize,

    /// Print the diagnostic snapshot as JSON once the run stops.
    #[arg(long)]
    snapshot: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let content = loading::content(&args.content)?;
    let config = match &args.config {
        Some(path) => loading::config(path)?,
        None => SessionConfig::default(),
    };
    let map = match args.map {
        Some(map) => map,
        None => content
            .maps()
            .next()
            .map(|map| map.id.clone())
            .context("content pack defines no maps")?,
    };

    let mut session = Session::new(&content, &map, config, Dice::seeded(args.seed))
        .with_context(|| format!("failed to start a mission on map '{map}'"))?;
    info!(map = %map, seed = args.seed, "running mission");

    let mut events = session.opening_events();
    trace_events(&events);

    let mut updates = 0;
    while session.outcome().is_none() && updates < args.max_updates {
        events.clear();
        play_controlled_turns(&mut session, &mut events);
        session.update(&mut events);
        trace_events(&events);
        updates += 1;
    }

    for line in query::log(session.world()).entries() {
        println!("{line}");
    }
    match session.outcome() {
        Some(outcome) => println!("Outcome: {outcome:?} in round {}", session.round()),
        None => {
            warn!(updates, "mission did not finish");
            println!("No outcome after {updates} updates");
        }
    }

    if args.snapshot {
        let snapshot = session
            .snapshot_json()
            .context("failed to serialize the diagnostic snapshot")?;
        println!("{snapshot}");
    }

    Ok(())
}

/// Plays every consecutive player-controlled turn with autopilot suggestions.
fn play_controlled_turns<R: Roll>(session: &mut Session<R>, events: &mut Vec<Event>) {
    while session.outcome().is_none() && !session.is_automated_turn() {
        let command = session.suggest_command();
        let ends_turn = command == Command::EndTurn;
        let start = events.len();
        session.apply(command, events);

        let rejected = events[start..]
            .iter()
            .any(|event| matches!(event, Event::CommandRejected { .. }));
        if rejected {
            session.apply(Command::EndTurn, events);
        }
        if ends_turn || rejected {
            break;
        }
    }
}

fn trace_events(events: &[Event]) {
    for event in events {
        debug!(?event, "event");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
