#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state for Skirmish.
//!
//! The world owns the board, the entity arena and the narration log. It
//! performs no rule checks of its own; systems read it through [`query`] and
//! the session mutates it through [`World::split_mut`].

mod board;
mod entity;
mod log;
mod roster;

pub use board::{Board, IMPASSABLE_COST};
pub use entity::{Entity, StatusEffect};
pub use log::{EventLog, DEFAULT_LOG_CAPACITY};
pub use roster::Roster;

use skirmish_core::{Content, ContentError, EntityId, MapDefinition};

/// Battlefield instantiated from a map definition.
#[derive(Clone, Debug)]
pub struct World {
    map_id: String,
    map_name: String,
    turn_limit: u32,
    board: Board,
    roster: Roster,
    combatants: Vec<EntityId>,
    log: EventLog,
}

/// Disjoint mutable views of the world's parts.
#[derive(Debug)]
pub struct WorldParts<'a> {
    /// Terrain grid.
    pub board: &'a mut Board,
    /// Entity arena.
    pub roster: &'a mut Roster,
    /// Narration log.
    pub log: &'a mut EventLog,
}

impl World {
    /// Builds the board and spawns every entity of the named map.
    ///
    /// Players spawn first, then enemies, then neutral characters, so handle
    /// order follows the map's spawn lists.
    pub fn from_map(
        content: &Content,
        map_id: &str,
        log_capacity: usize,
    ) -> Result<Self, ContentError> {
        let map = content.map(map_id)?;
        Self::from_definition(content, map, log_capacity)
    }

    /// Builds a world from an already resolved map definition.
    pub fn from_definition(
        content: &Content,
        map: &MapDefinition,
        log_capacity: usize,
    ) -> Result<Self, ContentError> {
        let board = Board::from_map(map, content);
        let mut roster = Roster::new();
        let mut combatants = Vec::with_capacity(map.players.len() + map.enemies.len());

        for spawn in map.players.iter().chain(map.enemies.iter()) {
            let definition = content.entity(&spawn.entity)?;
            combatants.push(roster.spawn(definition, spawn.cell));
        }
        for spawn in &map.npcs {
            let definition = content.entity(&spawn.entity)?;
            let _ = roster.spawn(definition, spawn.cell);
        }

        Ok(Self {
            map_id: map.id.clone(),
            map_name: map.display_name().to_owned(),
            turn_limit: map.turn_limit,
            board,
            roster,
            combatants,
            log: EventLog::new(log_capacity),
        })
    }

    /// Identifier of the map being played.
    #[must_use]
    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    /// Display name of the map being played.
    #[must_use]
    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Round after which the mission ends; zero disables the limit.
    #[must_use]
    pub const fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    /// Entities spawned from the player and enemy lists, in spawn order.
    #[must_use]
    pub fn combatants(&self) -> &[EntityId] {
        &self.combatants
    }

    /// Borrows the board, roster and log mutably at the same time.
    pub fn split_mut(&mut self) -> WorldParts<'_> {
        WorldParts {
            board: &mut self.board,
            roster: &mut self.roster,
            log: &mut self.log,
        }
    }

    /// Mutable access to the entity arena.
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Mutable access to the board.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Appends a narration line.
    pub fn narrate(&mut self, line: impl Into<String>) {
        self.log.push(line);
    }
}

/// Read-only queries over the world.
pub mod query {
    use skirmish_core::{EntityId, Faction};

    use super::{Board, Entity, EventLog, Roster, World};

    /// Provides read-only access to the terrain grid.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Provides read-only access to the entity arena.
    #[must_use]
    pub fn roster(world: &World) -> &Roster {
        &world.roster
    }

    /// Provides read-only access to the narration log.
    #[must_use]
    pub fn log(world: &World) -> &EventLog {
        &world.log
    }

    /// Looks up an entity by handle.
    #[must_use]
    pub fn entity(world: &World, id: EntityId) -> Option<&Entity> {
        world.roster.get(id)
    }

    /// Reports whether any member of the faction is still alive.
    #[must_use]
    pub fn faction_alive(world: &World, faction: Faction) -> bool {
        world.roster.any_alive(faction)
    }

    /// Nearest living entity hostile to `id`, by Manhattan distance.
    ///
    /// Ties resolve to the entity spawned first.
    #[must_use]
    pub fn nearest_hostile(world: &World, id: EntityId) -> Option<&Entity> {
        nearest_hostile_in(&world.roster, id)
    }

    /// [`nearest_hostile`] over a bare roster.
    #[must_use]
    pub fn nearest_hostile_in(roster: &Roster, id: EntityId) -> Option<&Entity> {
        let actor = roster.get(id)?;
        roster
            .iter()
            .filter(|other| other.is_alive() && actor.faction().is_hostile_to(other.faction()))
            .min_by_key(|other| actor.cell().manhattan_distance(other.cell()))
    }
}
