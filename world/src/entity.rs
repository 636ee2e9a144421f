//! Mutable combat-unit state.

use skirmish_core::{Attributes, CellCoord, EntityDefinition, EntityId, EntityKind, Faction};

const STARTING_LEVEL: u32 = 1;
const STARTING_EXPERIENCE_THRESHOLD: u32 = 100;
const THRESHOLD_GROWTH_PER_LEVEL: u32 = 50;
const HP_PER_LEVEL: u32 = 10;
const ENERGY_PER_LEVEL: u32 = 5;
const DEFAULT_DIALOG: &str = "...";

/// Timed modifier attached to an entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusEffect {
    id: String,
    remaining_turns: u32,
}

impl StatusEffect {
    /// Identifier of the status.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ticks left before the status expires.
    #[must_use]
    pub const fn remaining_turns(&self) -> u32 {
        self.remaining_turns
    }
}

/// A combat unit spawned from an immutable definition.
///
/// Hit points, energy and action points never underflow: every subtraction
/// saturates at zero, and healing never exceeds the maximum pools. An entity
/// is alive exactly while its hit points are above zero.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    definition_id: String,
    name: String,
    kind: EntityKind,
    faction: Faction,
    attributes: Attributes,
    level: u32,
    experience: u32,
    experience_to_next: u32,
    max_hp: u32,
    hp: u32,
    max_energy: u32,
    energy: u32,
    action_points: u32,
    base_attack: i32,
    attack_range: u32,
    abilities: Vec<String>,
    passives: Vec<String>,
    cell: CellCoord,
    statuses: Vec<StatusEffect>,
}

impl Entity {
    /// Spawns a fresh level one entity from its definition.
    #[must_use]
    pub fn spawn(id: EntityId, definition: &EntityDefinition, cell: CellCoord) -> Self {
        let kind = match &definition.kind {
            EntityKind::Npc { dialog } if dialog.is_empty() => EntityKind::Npc {
                dialog: DEFAULT_DIALOG.to_owned(),
            },
            kind => kind.clone(),
        };

        Self {
            id,
            definition_id: definition.id.clone(),
            name: definition.display_name().to_owned(),
            kind,
            faction: definition.faction,
            attributes: definition.attributes,
            level: STARTING_LEVEL,
            experience: 0,
            experience_to_next: STARTING_EXPERIENCE_THRESHOLD,
            max_hp: definition.max_hp,
            hp: definition.max_hp,
            max_energy: definition.max_energy,
            energy: definition.max_energy,
            action_points: 0,
            base_attack: definition.base_attack,
            attack_range: definition.attack_range,
            abilities: definition.abilities.clone(),
            passives: definition.passives.clone(),
            cell,
            statuses: Vec::new(),
        }
    }

    /// Arena handle of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Identifier of the definition the entity was spawned from.
    #[must_use]
    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    /// Display name used in narration.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of the entity.
    #[must_use]
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Dialog line spoken by non-player characters.
    #[must_use]
    pub fn dialog(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Npc { dialog } => Some(dialog),
            EntityKind::Player | EntityKind::Enemy => None,
        }
    }

    /// Allegiance of the entity.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Current attributes, including level-up gains.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Moves the entity without any rule checks.
    pub fn set_position(&mut self, cell: CellCoord) {
        self.cell = cell;
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Current energy.
    #[must_use]
    pub const fn energy(&self) -> u32 {
        self.energy
    }

    /// Maximum energy.
    #[must_use]
    pub const fn max_energy(&self) -> u32 {
        self.max_energy
    }

    /// Flat attack power.
    #[must_use]
    pub const fn base_attack(&self) -> i32 {
        self.base_attack
    }

    /// Manhattan reach of basic attacks.
    #[must_use]
    pub const fn attack_range(&self) -> u32 {
        self.attack_range
    }

    /// Identifiers of the abilities the entity knows.
    #[must_use]
    pub fn abilities(&self) -> &[String] {
        &self.abilities
    }

    /// Reports whether the entity knows the ability.
    #[must_use]
    pub fn knows_ability(&self, ability: &str) -> bool {
        self.abilities.iter().any(|known| known == ability)
    }

    /// Identifiers of passive effects.
    #[must_use]
    pub fn passives(&self) -> &[String] {
        &self.passives
    }

    /// Reports whether the entity still has hit points.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Removes hit points, stopping at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Restores hit points, stopping at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Action points left this turn.
    #[must_use]
    pub const fn action_points(&self) -> u32 {
        self.action_points
    }

    /// Overwrites the action points available this turn.
    pub fn set_action_points(&mut self, value: u32) {
        self.action_points = value;
    }

    /// Spends action points, stopping at zero.
    pub fn consume_action_points(&mut self, amount: u32) {
        self.action_points = self.action_points.saturating_sub(amount);
    }

    /// Reports whether at least `amount` action points remain.
    #[must_use]
    pub const fn has_action_points(&self, amount: u32) -> bool {
        self.action_points >= amount
    }

    /// Spends energy, stopping at zero.
    pub fn spend_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    /// Restores energy, stopping at the maximum.
    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
    }

    /// Reports whether at least `amount` energy remains.
    #[must_use]
    pub const fn has_energy(&self, amount: u32) -> bool {
        self.energy >= amount
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }

    /// Experience required to reach the next level.
    #[must_use]
    pub const fn experience_to_next(&self) -> u32 {
        self.experience_to_next
    }

    /// Adds experience, applying every level-up it pays for in sequence.
    ///
    /// Returns the number of levels gained.
    pub fn grant_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.experience_to_next += self.level * THRESHOLD_GROWTH_PER_LEVEL;
        self.attributes.strength += 1;
        self.attributes.agility += 1;
        self.attributes.intelligence += 1;
        self.attributes.defense += 1;
        self.max_hp += HP_PER_LEVEL;
        self.max_energy += ENERGY_PER_LEVEL;
        self.hp = self.max_hp;
        self.energy = self.max_energy;
    }

    /// Active statuses in the order they were added.
    #[must_use]
    pub fn statuses(&self) -> &[StatusEffect] {
        &self.statuses
    }

    /// Reports whether a status with the identifier is active.
    #[must_use]
    pub fn has_status(&self, id: &str) -> bool {
        self.statuses.iter().any(|status| status.id == id)
    }

    /// Attaches a timed status.
    pub fn add_status(&mut self, id: impl Into<String>, duration: u32) {
        self.statuses.push(StatusEffect {
            id: id.into(),
            remaining_turns: duration,
        });
    }

    /// Counts every status down by one tick and drops the expired ones.
    pub fn tick_statuses(&mut self) {
        for status in &mut self.statuses {
            status.remaining_turns = status.remaining_turns.saturating_sub(1);
        }
        self.statuses.retain(|status| status.remaining_turns > 0);
    }
}
