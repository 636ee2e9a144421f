#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! orchestrating session, the authoritative world, and pure systems. Adapters
//! submit [`Command`] values describing what the active entity wants to do,
//! the session executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values describing what actually happened. Immutable
//! content definitions live in the [`content`] module and are supplied fully
//! formed by whichever adapter loaded them.

pub mod content;

pub use content::{
    AbilityDefinition, AbilityEffect, AbilityTarget, Attributes, Content, ContentError,
    ContentPack, EntityDefinition, EntityKind, ItemDefinition, MapDefinition,
    ObjectiveDefinition, ObjectiveKind, SpawnDefinition, SpecialTileDefinition, SpecialTileKind,
    TerrainDefinition,
};

use serde::{Deserialize, Serialize};

/// Commands that express every action an entity may attempt during its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rolls the action points available to the active entity for this turn.
    RollActionPoints,
    /// Moves the active entity to a reachable destination cell.
    Move {
        /// Cell the entity wants to occupy after moving.
        to: CellCoord,
    },
    /// Performs a basic attack against another entity.
    Attack {
        /// Entity receiving the attack.
        target: EntityId,
    },
    /// Activates one of the active entity's abilities.
    UseAbility {
        /// Identifier of the ability definition to use.
        ability: String,
        /// Cell targeted by the ability. Ignored by self-targeted abilities.
        target: Option<CellCoord>,
    },
    /// Talks to an adjacent neutral entity or picks up an adjacent item.
    Interact {
        /// Cell adjacent to the active entity.
        cell: CellCoord,
    },
    /// Forfeits the remaining action points and ends the active turn.
    EndTurn,
}

/// Events broadcast by the session after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the mission on the provided map began.
    MissionStarted {
        /// Identifier of the map being played.
        map: String,
    },
    /// Announces that a new entity became the active actor.
    TurnStarted {
        /// Entity whose turn began.
        entity: EntityId,
        /// Round the turn belongs to.
        round: u32,
    },
    /// Announces that the round counter advanced.
    RoundAdvanced {
        /// Round that just began.
        round: u32,
    },
    /// Reports the action points granted to the active entity.
    ActionPointsRolled {
        /// Entity that received the action points.
        entity: EntityId,
        /// Number of action points granted.
        amount: u32,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell occupied before moving.
        from: CellCoord,
        /// Cell occupied after moving.
        to: CellCoord,
        /// Action points spent on the move.
        cost: u32,
    },
    /// Reports the result of a basic attack.
    AttackResolved {
        /// Entity that attacked.
        attacker: EntityId,
        /// Entity that was attacked.
        defender: EntityId,
        /// How the attack played out.
        outcome: AttackOutcome,
    },
    /// Confirms that an ability was paid for and applied.
    AbilityUsed {
        /// Entity that used the ability.
        user: EntityId,
        /// Identifier of the ability definition.
        ability: String,
        /// Entity affected by the ability, if any.
        target: Option<EntityId>,
    },
    /// Reports that a special tile reacted to an entity entering it.
    TileTriggered {
        /// Entity that entered the tile.
        entity: EntityId,
        /// Cell holding the special tile.
        cell: CellCoord,
        /// Kind of special tile that fired.
        kind: SpecialTileKind,
    },
    /// Reports that an entity's hit points reached zero.
    EntityDefeated {
        /// Entity that was defeated.
        entity: EntityId,
    },
    /// Reports a conversation with a neutral entity.
    ConversationHeld {
        /// Entity that initiated the conversation.
        speaker: EntityId,
        /// Neutral entity that was talked to.
        npc: EntityId,
    },
    /// Reports that an item was collected from the board.
    ItemCollected {
        /// Entity that collected the item.
        entity: EntityId,
        /// Item reference attached to the tile, if any.
        item: Option<String>,
    },
    /// Reports that a mission objective became complete.
    ObjectiveCompleted {
        /// Position of the objective within the mission.
        index: usize,
    },
    /// Announces that the simulation reached a terminal state.
    SimulationEnded {
        /// Terminal state that was reached.
        outcome: Outcome,
    },
    /// Reports that a command was refused without mutating any state.
    CommandRejected {
        /// Specific reason the command was refused.
        reason: RejectionReason,
    },
}

/// Result of resolving a basic attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttackOutcome {
    /// One of the parties was already dead, so nothing happened.
    Ignored,
    /// The defender dodged; no damage was dealt.
    Dodged,
    /// The attack connected.
    Hit {
        /// Hit points removed from the defender.
        damage: u32,
        /// Whether the hit defeated the defender.
        defeated: bool,
    },
}

impl AttackOutcome {
    /// Hit points removed by the attack, zero for dodges and ignored attacks.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        match self {
            Self::Hit { damage, .. } => *damage,
            Self::Ignored | Self::Dodged => 0,
        }
    }

    /// Reports whether the attack defeated the defender.
    #[must_use]
    pub const fn defeated(&self) -> bool {
        matches!(self, Self::Hit { defeated: true, .. })
    }
}

/// Terminal states of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every mission objective was completed.
    Victory,
    /// Every player-controlled entity was defeated.
    Defeat,
    /// The map's round limit elapsed before the mission was completed.
    TurnLimitReached,
    /// The initiative order ran out of participants.
    NoCombatants,
}

/// Reasons a command may be rejected by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The simulation already reached a terminal state.
    GameOver,
    /// No entity currently holds the turn.
    NoActiveEntity,
    /// The active entity is driven by the autopilot and accepts no commands.
    AutomatedTurn,
    /// Action points must be rolled before acting.
    AwaitingRoll,
    /// Action points were already rolled this turn.
    AlreadyRolled,
    /// The active entity cannot afford the action.
    InsufficientActionPoints,
    /// The active entity cannot afford the ability's energy cost.
    InsufficientEnergy,
    /// The destination cannot be reached with the available budget.
    Unreachable,
    /// The destination is occupied by a living entity.
    Occupied,
    /// The target lies outside the permitted range.
    OutOfRange,
    /// The target is not a legal recipient of the action.
    InvalidTarget,
    /// The active entity does not know the requested ability.
    UnknownAbility,
    /// The cell holds nothing to interact with.
    NothingToInteract,
}

/// Allegiance grouping that constrains valid targeting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// Player-controlled entities.
    #[default]
    Players,
    /// Adversaries driven by the autopilot.
    Enemies,
    /// Bystanders that never take turns.
    Neutral,
}

impl Faction {
    /// Reports whether members of the two factions may attack each other.
    #[must_use]
    pub const fn is_hostile_to(self, other: Faction) -> bool {
        matches!(
            (self, other),
            (Self::Players, Self::Enemies) | (Self::Enemies, Self::Players)
        )
    }
}

/// Handle of an entity stored in the world's entity arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the entity inside the arena.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "x")]
    column: u32,
    #[serde(rename = "y")]
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the adjacent cell in the provided direction.
    ///
    /// Stepping past the zero row or column yields `None`; upper bounds are
    /// the board's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in the order neighbours are expanded.
    pub const ALL: [Direction; 4] = [Self::East, Self::West, Self::South, Self::North];
}

/// One-way diagnostic dump of a running simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticSnapshot {
    /// Identifier of the map being played.
    pub map: String,
    /// Current round.
    pub turn: u32,
    /// Every entity in arena order.
    pub entities: Vec<EntityRecord>,
    /// Every objective in mission order.
    pub objectives: Vec<ObjectiveRecord>,
}

/// Entity state captured by a [`DiagnosticSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityRecord {
    /// Definition identifier of the entity.
    pub id: String,
    /// Current hit points.
    pub hp: u32,
    /// Current energy.
    pub energy: u32,
    /// Current level.
    pub level: u32,
    /// Column of the occupied cell.
    pub x: u32,
    /// Row of the occupied cell.
    pub y: u32,
}

/// Objective state captured by a [`DiagnosticSnapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObjectiveRecord {
    /// Human readable objective description.
    pub desc: String,
    /// Whether the objective is complete.
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::{AttackOutcome, CellCoord, Direction, Faction};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_refuses_to_leave_the_origin_edge() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(corner.step(Direction::South), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn only_players_and_enemies_are_hostile() {
        assert!(Faction::Players.is_hostile_to(Faction::Enemies));
        assert!(Faction::Enemies.is_hostile_to(Faction::Players));
        assert!(!Faction::Players.is_hostile_to(Faction::Players));
        assert!(!Faction::Neutral.is_hostile_to(Faction::Enemies));
        assert!(!Faction::Players.is_hostile_to(Faction::Neutral));
    }

    #[test]
    fn attack_outcome_reports_damage() {
        assert_eq!(AttackOutcome::Dodged.damage(), 0);
        assert_eq!(AttackOutcome::Ignored.damage(), 0);
        let hit = AttackOutcome::Hit {
            damage: 7,
            defeated: true,
        };
        assert_eq!(hit.damage(), 7);
        assert!(hit.defeated());
    }

    #[test]
    fn cell_coord_uses_xy_field_names() {
        let cell: CellCoord = serde_json::from_str(r#"{"x": 3, "y": 5}"#).expect("deserialize");
        assert_eq!(cell, CellCoord::new(3, 5));
    }
}
