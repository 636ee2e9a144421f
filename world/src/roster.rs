//! Arena that owns every entity of a simulation.

use skirmish_core::{CellCoord, EntityDefinition, EntityId, Faction};

use crate::Entity;

/// Owner of every entity, addressed by [`EntityId`] handles.
///
/// Entities are never removed; handles stay valid for the whole simulation
/// and dead entities simply stop occupying cells.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an entity and allocates its handle.
    pub fn spawn(&mut self, definition: &EntityDefinition, cell: CellCoord) -> EntityId {
        let id = EntityId::new(u32::try_from(self.entities.len()).unwrap_or(u32::MAX));
        self.entities.push(Entity::spawn(id, definition, cell));
        id
    }

    /// Number of spawned entities, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether nothing was spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Looks up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    /// Looks up an entity for mutation.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    /// Borrows two distinct entities mutably at once.
    ///
    /// Returns `None` when the handles are equal or either is unknown.
    pub fn pair_mut(
        &mut self,
        first: EntityId,
        second: EntityId,
    ) -> Option<(&mut Entity, &mut Entity)> {
        let (first_index, second_index) = (first.index(), second.index());
        if first_index == second_index || first_index.max(second_index) >= self.entities.len() {
            return None;
        }

        if first_index < second_index {
            let (head, tail) = self.entities.split_at_mut(second_index);
            Some((&mut head[first_index], &mut tail[0]))
        } else {
            let (head, tail) = self.entities.split_at_mut(first_index);
            Some((&mut tail[0], &mut head[second_index]))
        }
    }

    /// Iterator over every entity in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Living entity standing on the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.is_alive() && entity.cell() == cell)
    }

    /// Reports whether a living entity stands on the cell.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_some()
    }

    /// Reports whether any member of the faction is still alive.
    #[must_use]
    pub fn any_alive(&self, faction: Faction) -> bool {
        self.entities
            .iter()
            .any(|entity| entity.faction() == faction && entity.is_alive())
    }

    /// Advances the statuses of every entity by one tick.
    pub fn tick_statuses(&mut self) {
        for entity in &mut self.entities {
            entity.tick_statuses();
        }
    }
}
