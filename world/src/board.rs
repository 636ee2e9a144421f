//! Terrain grid with per-cell special tiles.

use skirmish_core::{
    CellCoord, Content, MapDefinition, SpecialTileDefinition, SpecialTileKind, TerrainDefinition,
};

/// Movement cost reported for cells that cannot be entered at all.
pub const IMPASSABLE_COST: u32 = 9_999;

#[derive(Clone, Debug)]
struct Tile {
    terrain: usize,
    special: Option<SpecialTileDefinition>,
}

/// Rectangular board of terrain cells.
///
/// Terrain is shared through a palette so every cell painted with the same
/// type stores a single index. Queries outside the board never panic: they
/// report the most restrictive answer instead.
#[derive(Clone, Debug)]
pub struct Board {
    width: u32,
    height: u32,
    palette: Vec<TerrainDefinition>,
    tiles: Vec<Tile>,
}

impl Board {
    /// Creates a board covered by a single terrain type.
    #[must_use]
    pub fn filled(width: u32, height: u32, terrain: TerrainDefinition) -> Self {
        let cell_count = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(width, height)| width.checked_mul(height))
            .unwrap_or(0);

        Self {
            width,
            height,
            palette: vec![terrain],
            tiles: vec![
                Tile {
                    terrain: 0,
                    special: None,
                };
                cell_count
            ],
        }
    }

    /// Builds the board described by a map definition.
    ///
    /// Unknown terrain identifiers resolve to the content's fallback terrain
    /// and special tiles outside the map are dropped.
    #[must_use]
    pub fn from_map(map: &MapDefinition, content: &Content) -> Self {
        let fallback = content.terrain_or_fallback("");
        let mut board = Self::filled(map.width, map.height, fallback.clone());

        for row in 0..map.height {
            for column in 0..map.width {
                let cell = CellCoord::new(column, row);
                let terrain = content.terrain_or_fallback(map.terrain_id(cell));
                if terrain.id != fallback.id {
                    board.paint(cell, terrain);
                }
            }
        }

        for special in &map.specials {
            let _ = board.place_special(special.clone());
        }

        board
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Replaces the terrain of a single cell. Cells outside the board are ignored.
    pub fn paint(&mut self, cell: CellCoord, terrain: &TerrainDefinition) {
        let Some(index) = self.index(cell) else {
            return;
        };

        let palette_index = match self
            .palette
            .iter()
            .position(|existing| existing.id == terrain.id)
        {
            Some(position) => position,
            None => {
                self.palette.push(terrain.clone());
                self.palette.len() - 1
            }
        };
        self.tiles[index].terrain = palette_index;
    }

    /// Attaches a special tile to its cell, replacing any previous one.
    ///
    /// Returns `false` when the cell lies outside the board.
    pub fn place_special(&mut self, special: SpecialTileDefinition) -> bool {
        match self.index(special.cell) {
            Some(index) => {
                self.tiles[index].special = Some(special);
                true
            }
            None => false,
        }
    }

    /// Terrain painted on the cell.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<&TerrainDefinition> {
        let tile = self.tile(cell)?;
        self.palette.get(tile.terrain)
    }

    /// Action points needed to enter the cell, never below one.
    ///
    /// Cells outside the board cost [`IMPASSABLE_COST`].
    #[must_use]
    pub fn movement_cost(&self, cell: CellCoord) -> u32 {
        self.terrain(cell)
            .map_or(IMPASSABLE_COST, |terrain| terrain.movement_cost.max(1))
    }

    /// Defense bonus granted by the cell's terrain.
    #[must_use]
    pub fn defense_modifier(&self, cell: CellCoord) -> i32 {
        self.terrain(cell)
            .map_or(0, |terrain| terrain.defense_modifier)
    }

    /// Dodge bonus granted by the cell's terrain.
    #[must_use]
    pub fn dodge_modifier(&self, cell: CellCoord) -> i32 {
        self.terrain(cell).map_or(0, |terrain| terrain.dodge_modifier)
    }

    /// Reports whether entities are barred from entering the cell.
    #[must_use]
    pub fn blocks_movement(&self, cell: CellCoord) -> bool {
        self.terrain(cell)
            .map_or(true, |terrain| terrain.blocks_movement)
    }

    /// Reports whether the cell obstructs sight.
    #[must_use]
    pub fn blocks_line_of_sight(&self, cell: CellCoord) -> bool {
        self.terrain(cell)
            .map_or(true, |terrain| terrain.blocks_line_of_sight)
    }

    /// Special tile attached to the cell, if any.
    #[must_use]
    pub fn special(&self, cell: CellCoord) -> Option<&SpecialTileDefinition> {
        self.tile(cell)?.special.as_ref()
    }

    /// Kind of special tile on the cell; [`SpecialTileKind::None`] when there is none.
    #[must_use]
    pub fn special_kind(&self, cell: CellCoord) -> SpecialTileKind {
        self.special(cell)
            .map_or(SpecialTileKind::None, |special| special.kind)
    }

    /// Removes and returns the special tile on the cell.
    pub fn clear_special(&mut self, cell: CellCoord) -> Option<SpecialTileDefinition> {
        let index = self.index(cell)?;
        self.tiles[index].special.take()
    }

    fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).and_then(|index| self.tiles.get(index))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain(id: &str, movement_cost: u32) -> TerrainDefinition {
        TerrainDefinition {
            id: id.to_owned(),
            name: String::new(),
            movement_cost,
            defense_modifier: 0,
            dodge_modifier: 0,
            blocks_movement: false,
            blocks_line_of_sight: false,
        }
    }

    fn special(kind: SpecialTileKind, column: u32, row: u32) -> SpecialTileDefinition {
        SpecialTileDefinition {
            kind,
            cell: CellCoord::new(column, row),
            value: 5,
            target: None,
        }
    }

    #[test]
    fn out_of_bounds_cells_are_maximally_restrictive() {
        let board = Board::filled(3, 2, terrain("plain", 1));
        let outside = CellCoord::new(3, 0);

        assert!(!board.contains(outside));
        assert_eq!(board.movement_cost(outside), IMPASSABLE_COST);
        assert!(board.blocks_movement(outside));
        assert!(board.blocks_line_of_sight(outside));
        assert_eq!(board.defense_modifier(outside), 0);
        assert_eq!(board.dodge_modifier(outside), 0);
        assert_eq!(board.special_kind(outside), SpecialTileKind::None);
    }

    #[test]
    fn zero_cost_terrain_still_costs_one_action_point() {
        let board = Board::filled(2, 2, terrain("ice", 0));
        assert_eq!(board.movement_cost(CellCoord::new(1, 1)), 1);
    }

    #[test]
    fn painting_shares_palette_entries() {
        let mut board = Board::filled(4, 4, terrain("plain", 1));
        let mut forest = terrain("forest", 2);
        forest.defense_modifier = 2;
        forest.dodge_modifier = 10;

        board.paint(CellCoord::new(1, 1), &forest);
        board.paint(CellCoord::new(2, 1), &forest);
        board.paint(CellCoord::new(9, 9), &forest);

        assert_eq!(board.palette.len(), 2);
        assert_eq!(board.movement_cost(CellCoord::new(2, 1)), 2);
        assert_eq!(board.defense_modifier(CellCoord::new(1, 1)), 2);
        assert_eq!(board.dodge_modifier(CellCoord::new(1, 1)), 10);
        assert_eq!(board.movement_cost(CellCoord::new(0, 0)), 1);
    }

    #[test]
    fn specials_outside_the_board_are_dropped() {
        let mut board = Board::filled(2, 2, terrain("plain", 1));

        assert!(board.place_special(special(SpecialTileKind::Trap, 1, 1)));
        assert!(!board.place_special(special(SpecialTileKind::Heal, 2, 0)));

        assert_eq!(board.special_kind(CellCoord::new(1, 1)), SpecialTileKind::Trap);
        assert_eq!(board.special(CellCoord::new(1, 1)).map(|s| s.value), Some(5));
    }

    #[test]
    fn clearing_a_special_returns_it_once() {
        let mut board = Board::filled(2, 2, terrain("plain", 1));
        let _ = board.place_special(special(SpecialTileKind::Item, 0, 1));

        let cleared = board.clear_special(CellCoord::new(0, 1));
        assert_eq!(cleared.map(|s| s.kind), Some(SpecialTileKind::Item));
        assert_eq!(board.clear_special(CellCoord::new(0, 1)), None);
        assert_eq!(board.special_kind(CellCoord::new(0, 1)), SpecialTileKind::None);
    }
}
