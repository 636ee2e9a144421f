use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use skirmish_core::{Command, Content, ContentPack, Event, Outcome};
use skirmish_session::{Session, SessionConfig};
use skirmish_system_dice::Dice;
use skirmish_world::query;

const MAX_UPDATES: usize = 400;

#[test]
fn seeded_runs_replay_identically() {
    let first = replay(0x5eed);
    let second = replay(0x5eed);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.outcome.is_some(), "simulation never finished");
}

#[test]
fn replay_records_the_whole_match() {
    let outcome = replay(7);

    assert!(outcome
        .events
        .first()
        .is_some_and(|record| record.starts_with("MissionStarted")));
    assert!(outcome
        .events
        .last()
        .is_some_and(|record| record.starts_with("SimulationEnded")));
}

fn replay(seed: u64) -> ReplayOutcome {
    let content = content();
    let mut session = Session::new(
        &content,
        "crossing",
        SessionConfig::default(),
        Dice::seeded(seed),
    )
    .expect("map exists");
    let mut log: Vec<String> = session.opening_events().iter().map(record).collect();

    for _ in 0..MAX_UPDATES {
        if session.outcome().is_some() {
            break;
        }
        while !session.is_automated_turn() && session.outcome().is_none() {
            let mut events = Vec::new();
            let command = session.suggest_command();
            let ends_turn = command == Command::EndTurn;
            session.apply(command, &mut events);
            log.extend(events.iter().map(record));
            let rejected = events
                .iter()
                .any(|event| matches!(event, Event::CommandRejected { .. }));
            if ends_turn || rejected {
                break;
            }
        }
        let mut events = Vec::new();
        session.update(&mut events);
        log.extend(events.iter().map(record));
    }

    let entities = query::roster(session.world())
        .iter()
        .map(|entity| EntityState {
            hp: entity.hp(),
            column: entity.cell().column(),
            row: entity.cell().row(),
            level: entity.level(),
        })
        .collect();

    ReplayOutcome {
        outcome: session.outcome(),
        round: session.round(),
        entities,
        events: log,
    }
}

fn record(event: &Event) -> String {
    format!("{event:?}")
}

fn content() -> Content {
    let pack: ContentPack = serde_json::from_str(
        r#"{
            "terrain": [
                {"id": "plain"},
                {"id": "forest", "movement_cost": 2, "defense_modifier": 2, "dodge_modifier": 10},
                {"id": "rock", "blocks_movement": true, "blocks_line_of_sight": true}
            ],
            "entities": [
                {"id": "knight", "kind": "player", "attributes": {"strength": 4, "agility": 2, "intelligence": 1, "defense": 4}},
                {"id": "ranger", "kind": "player", "range": 3, "hp": 80, "attributes": {"strength": 2, "agility": 5, "intelligence": 2, "defense": 2}},
                {"id": "raider", "kind": "enemy", "faction": "enemies", "hp": 60},
                {"id": "chief", "kind": "enemy", "faction": "enemies", "hp": 90, "attack": 12}
            ],
            "maps": [{
                "id": "crossing",
                "name": "River Crossing",
                "width": 8,
                "height": 6,
                "turn_limit": 30,
                "rows": [
                    [],
                    ["plain", "forest", "forest"],
                    ["plain", "plain", "plain", "rock"],
                    ["plain", "plain", "plain", "rock"]
                ],
                "specials": [
                    {"type": "heal", "x": 2, "y": 4, "value": 20},
                    {"type": "trap", "x": 5, "y": 1, "value": 10}
                ],
                "objectives": [
                    {"description": "Defeat the chief", "type": "defeat_enemies", "target": "chief", "amount": 1},
                    {"description": "Rout the raiders", "type": "defeat_enemies", "amount": 2}
                ],
                "players": [
                    {"entity": "knight", "x": 0, "y": 2},
                    {"entity": "ranger", "x": 0, "y": 4}
                ],
                "enemies": [
                    {"entity": "raider", "x": 7, "y": 1},
                    {"entity": "chief", "x": 7, "y": 4}
                ]
            }]
        }"#,
    )
    .expect("pack deserializes");
    Content::from_pack(pack).expect("valid pack")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    outcome: Option<Outcome>,
    round: u32,
    entities: Vec<EntityState>,
    events: Vec<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct EntityState {
    hp: u32,
    column: u32,
    row: u32,
    level: u32,
}
