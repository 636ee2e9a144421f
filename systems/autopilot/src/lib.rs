#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy turn planner for automated actors.
//!
//! The planner chases the nearest hostile entity: it attacks when the target
//! is in reach and affordable, otherwise takes one step toward it, and ends
//! the turn whenever neither is possible. It only reads the world and emits
//! a single [`Command`] per call.

use skirmish_core::{CellCoord, Command, Direction, EntityId};
use skirmish_world::{query, Board, Entity, Roster};

/// Planner that chooses one command at a time for an automated actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Autopilot {
    attack_cost: u32,
}

impl Autopilot {
    /// Creates a planner that budgets `attack_cost` action points per attack.
    #[must_use]
    pub const fn new(attack_cost: u32) -> Self {
        Self { attack_cost }
    }

    /// Chooses the next command for `actor`.
    ///
    /// Returns [`Command::EndTurn`] when the actor is unknown, dead, out of
    /// action points, has no living hostile left, or cannot make progress.
    #[must_use]
    pub fn next_command(&self, board: &Board, roster: &Roster, actor: EntityId) -> Command {
        let Some(entity) = roster.get(actor).filter(|entity| entity.is_alive()) else {
            return Command::EndTurn;
        };
        if entity.action_points() == 0 {
            return Command::EndTurn;
        }
        let Some(target) = query::nearest_hostile_in(roster, actor) else {
            return Command::EndTurn;
        };

        let distance = entity.cell().manhattan_distance(target.cell());
        if distance <= entity.attack_range() && entity.has_action_points(self.attack_cost) {
            return Command::Attack {
                target: target.id(),
            };
        }

        match step_toward(entity.cell(), target.cell()) {
            Some(next) if can_enter(board, roster, entity, next) => Command::Move { to: next },
            _ => Command::EndTurn,
        }
    }
}

/// Adjacent cell one step toward `goal`, closing the horizontal gap first.
fn step_toward(from: CellCoord, goal: CellCoord) -> Option<CellCoord> {
    let direction = if goal.column() > from.column() {
        Direction::East
    } else if goal.column() < from.column() {
        Direction::West
    } else if goal.row() > from.row() {
        Direction::South
    } else if goal.row() < from.row() {
        Direction::North
    } else {
        return None;
    };
    from.step(direction)
}

fn can_enter(board: &Board, roster: &Roster, entity: &Entity, cell: CellCoord) -> bool {
    board.contains(cell)
        && !board.blocks_movement(cell)
        && !roster.is_occupied(cell)
        && entity.has_action_points(board.movement_cost(cell))
}
