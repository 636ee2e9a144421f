#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cost-limited movement and attack-range queries over the board.

use std::collections::VecDeque;

use skirmish_core::{CellCoord, Direction};
use skirmish_world::{Board, Entity, Roster};

/// Dense per-cell movement costs measured from a single origin.
///
/// Cells that cannot be reached within the budget hold `None`. The origin
/// holds `Some(0)`, which keeps it distinct from unreachable cells while
/// excluding it from [`CostMap::destinations`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostMap {
    width: u32,
    height: u32,
    origin: CellCoord,
    costs: Vec<Option<u32>>,
}

impl CostMap {
    /// Cell the costs were measured from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Action points needed to reach the cell, if it is reachable at all.
    #[must_use]
    pub fn cost(&self, cell: CellCoord) -> Option<u32> {
        let index = index(self.width, self.height, cell)?;
        self.costs.get(index).copied().flatten()
    }

    /// Reports whether the cell is a legal destination other than the origin.
    #[must_use]
    pub fn is_destination(&self, cell: CellCoord) -> bool {
        self.cost(cell).is_some_and(|cost| cost > 0)
    }

    /// Every reachable cell except the origin, with its cost, in row-major order.
    pub fn destinations(&self) -> impl Iterator<Item = (CellCoord, u32)> + '_ {
        let width = self.width;
        self.costs
            .iter()
            .enumerate()
            .filter_map(move |(offset, cost)| {
                let cost = (*cost).filter(|cost| *cost > 0)?;
                let offset = u32::try_from(offset).ok()?;
                Some((CellCoord::new(offset % width, offset / width), cost))
            })
    }
}

/// Computes the movement costs available to an entity with `budget` action points.
///
/// Cells held by living entities can be neither entered nor crossed.
#[must_use]
pub fn movement_costs(board: &Board, roster: &Roster, entity: &Entity, budget: u32) -> CostMap {
    movement_costs_with(board, entity.cell(), budget, |cell| roster.is_occupied(cell))
}

/// Computes movement costs from `origin` with a caller supplied occupancy test.
///
/// Propagation is a FIFO relaxation: a neighbour is queued whenever the new
/// accumulated cost fits the budget and beats its recorded cost, so a cell may
/// be expanded more than once when cheaper routes arrive late.
pub fn movement_costs_with<F>(
    board: &Board,
    origin: CellCoord,
    budget: u32,
    mut is_occupied: F,
) -> CostMap
where
    F: FnMut(CellCoord) -> bool,
{
    let (width, height) = (board.width(), board.height());
    let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
    let mut costs = vec![None; cell_count];

    let Some(origin_index) = index(width, height, origin) else {
        return CostMap {
            width,
            height,
            origin,
            costs,
        };
    };
    costs[origin_index] = Some(0);

    let mut queue = VecDeque::from([(origin, 0u32)]);
    while let Some((cell, accumulated)) = queue.pop_front() {
        for neighbor in Direction::ALL
            .into_iter()
            .filter_map(|direction| cell.step(direction))
        {
            let Some(neighbor_index) = index(width, height, neighbor) else {
                continue;
            };
            if board.blocks_movement(neighbor) || is_occupied(neighbor) {
                continue;
            }

            let next = accumulated.saturating_add(board.movement_cost(neighbor));
            if next > budget {
                continue;
            }
            if costs[neighbor_index].is_some_and(|recorded| recorded <= next) {
                continue;
            }

            costs[neighbor_index] = Some(next);
            queue.push_back((neighbor, next));
        }
    }

    CostMap {
        width,
        height,
        origin,
        costs,
    }
}

/// Cells on the board within Manhattan `distance` of `origin`, excluding `origin`.
///
/// Terrain and occupants are ignored. Cells are listed in row-major order.
#[must_use]
pub fn range(board: &Board, origin: CellCoord, distance: u32) -> Vec<CellCoord> {
    let first_row = origin.row().saturating_sub(distance);
    let last_row = origin
        .row()
        .saturating_add(distance)
        .min(board.height().saturating_sub(1));
    let first_column = origin.column().saturating_sub(distance);
    let last_column = origin
        .column()
        .saturating_add(distance)
        .min(board.width().saturating_sub(1));

    let mut cells = Vec::new();
    if board.width() == 0 || board.height() == 0 {
        return cells;
    }
    for row in first_row..=last_row {
        for column in first_column..=last_column {
            let cell = CellCoord::new(column, row);
            if cell != origin && origin.manhattan_distance(cell) <= distance {
                cells.push(cell);
            }
        }
    }
    cells
}

fn index(width: u32, height: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= width || cell.row() >= height {
        return None;
    }
    let width = usize::try_from(width).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::TerrainDefinition;

    fn terrain(id: &str, movement_cost: u32, blocks_movement: bool) -> TerrainDefinition {
        TerrainDefinition {
            id: id.to_owned(),
            name: String::new(),
            movement_cost,
            defense_modifier: 0,
            dodge_modifier: 0,
            blocks_movement,
            blocks_line_of_sight: blocks_movement,
        }
    }

    #[test]
    fn origin_is_free_but_not_a_destination() {
        let board = Board::filled(3, 3, terrain("plain", 1, false));
        let costs = movement_costs_with(&board, CellCoord::new(1, 1), 0, |_| false);

        assert_eq!(costs.cost(CellCoord::new(1, 1)), Some(0));
        assert!(!costs.is_destination(CellCoord::new(1, 1)));
        assert_eq!(costs.cost(CellCoord::new(0, 1)), None);
        assert_eq!(costs.destinations().count(), 0);
    }

    #[test]
    fn expensive_terrain_is_routed_around_when_cheaper() {
        // Row 1 is swamp except the far right column.
        let mut board = Board::filled(3, 3, terrain("plain", 1, false));
        let swamp = terrain("swamp", 5, false);
        board.paint(CellCoord::new(0, 1), &swamp);
        board.paint(CellCoord::new(1, 1), &swamp);

        let costs = movement_costs_with(&board, CellCoord::new(0, 0), 6, |_| false);

        assert_eq!(costs.cost(CellCoord::new(0, 1)), Some(5));
        assert_eq!(costs.cost(CellCoord::new(2, 1)), Some(3));
        assert_eq!(costs.cost(CellCoord::new(0, 2)), Some(6));
        assert_eq!(costs.cost(CellCoord::new(2, 2)), Some(4));
    }

    #[test]
    fn walls_and_occupants_cannot_be_crossed() {
        let mut board = Board::filled(3, 1, terrain("plain", 1, false));
        board.paint(CellCoord::new(1, 0), &terrain("wall", 1, true));

        let walled = movement_costs_with(&board, CellCoord::new(0, 0), 10, |_| false);
        assert_eq!(walled.cost(CellCoord::new(1, 0)), None);
        assert_eq!(walled.cost(CellCoord::new(2, 0)), None);

        let open = Board::filled(3, 1, terrain("plain", 1, false));
        let blocked = movement_costs_with(&open, CellCoord::new(0, 0), 10, |cell| {
            cell == CellCoord::new(1, 0)
        });
        assert_eq!(blocked.cost(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn budget_caps_accumulated_cost() {
        let board = Board::filled(5, 1, terrain("hill", 2, false));
        let costs = movement_costs_with(&board, CellCoord::new(0, 0), 5, |_| false);

        let destinations: Vec<_> = costs.destinations().collect();
        assert_eq!(
            destinations,
            vec![(CellCoord::new(1, 0), 2), (CellCoord::new(2, 0), 4)]
        );
    }

    #[test]
    fn range_is_clipped_to_the_board() {
        let board = Board::filled(3, 3, terrain("plain", 1, false));
        let cells = range(&board, CellCoord::new(0, 0), 1);

        assert_eq!(cells, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);
    }

    #[test]
    fn range_zero_is_empty() {
        let board = Board::filled(3, 3, terrain("plain", 1, false));
        assert!(range(&board, CellCoord::new(1, 1), 0).is_empty());
    }

    #[test]
    fn range_ignores_walls() {
        let mut board = Board::filled(3, 3, terrain("plain", 1, false));
        board.paint(CellCoord::new(1, 0), &terrain("wall", 1, true));

        let cells = range(&board, CellCoord::new(1, 1), 1);
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&CellCoord::new(1, 0)));
    }
}
