//! Immutable content definitions consumed by the simulation.
//!
//! Definitions arrive fully formed from an external loader. [`ContentPack`]
//! mirrors the raw shape of a data file, while [`Content`] is the indexed,
//! validated registry the rest of the engine queries by identifier.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, Faction};

const FALLBACK_TERRAIN_ID: &str = "plain";

/// Errors raised when content violates the engine's contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    /// Two definitions of the same category share an identifier.
    #[error("duplicate {category} definition '{id}'")]
    DuplicateId {
        /// Category of the clashing definitions.
        category: &'static str,
        /// Identifier that appears more than once.
        id: String,
    },
    /// An ability identifier does not resolve to a definition.
    #[error("unknown ability '{0}'")]
    UnknownAbility(String),
    /// An entity identifier does not resolve to a definition.
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),
    /// A map identifier does not resolve to a definition.
    #[error("unknown map '{0}'")]
    UnknownMap(String),
    /// The pack defines no terrain types at all.
    #[error("content defines no terrain types")]
    MissingTerrain,
    /// A map has zero width or height.
    #[error("map '{0}' has no cells")]
    EmptyMap(String),
    /// A spawn point lies outside its map.
    #[error("spawn of '{entity}' at ({}, {}) lies outside map '{map}'", .cell.column(), .cell.row())]
    SpawnOutOfBounds {
        /// Map holding the spawn.
        map: String,
        /// Entity definition being spawned.
        entity: String,
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Core attributes shared by every entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Adds to basic attack power.
    pub strength: i32,
    /// Drives initiative and dodge chance.
    pub agility: i32,
    /// Adds to ability damage.
    pub intelligence: i32,
    /// Subtracts from incoming attack power.
    pub defense: i32,
}

impl Attributes {
    /// Creates an attribute block from explicit values.
    #[must_use]
    pub const fn new(strength: i32, agility: i32, intelligence: i32, defense: i32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            defense,
        }
    }
}

/// Kind of an entity. Only non-player characters carry extra data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityKind {
    /// Player-controlled unit.
    Player,
    /// Adversary unit.
    Enemy,
    /// Non-player character that can be talked to.
    Npc {
        /// Line spoken when a player interacts with the character.
        #[serde(default)]
        dialog: String,
    },
}

/// Immutable template an entity is spawned from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Unique identifier.
    pub id: String,
    /// Display name; the identifier is used when empty.
    #[serde(default)]
    pub name: String,
    /// Kind of entity.
    #[serde(flatten)]
    pub kind: EntityKind,
    /// Allegiance of the entity.
    #[serde(default)]
    pub faction: Faction,
    /// Starting attributes.
    #[serde(default = "default_attributes")]
    pub attributes: Attributes,
    /// Starting and maximum hit points.
    #[serde(default = "default_max_hp", alias = "hp")]
    pub max_hp: u32,
    /// Starting and maximum energy.
    #[serde(default = "default_max_energy", alias = "energy")]
    pub max_energy: u32,
    /// Flat attack power added to every basic attack.
    #[serde(default = "default_base_attack", alias = "attack")]
    pub base_attack: i32,
    /// Manhattan reach of basic attacks.
    #[serde(default = "default_range", alias = "range")]
    pub attack_range: u32,
    /// Identifiers of the abilities the entity knows.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Identifiers of passive effects. Carried for presentation only.
    #[serde(default)]
    pub passives: Vec<String>,
}

impl EntityDefinition {
    /// Name shown in narration, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Who an ability may be aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityTarget {
    /// The user itself.
    #[serde(rename = "self")]
    SelfOnly,
    /// A member of the user's faction.
    Ally,
    /// A hostile entity.
    #[default]
    Enemy,
    /// Any cell within range.
    Area,
}

/// What an ability does once paid for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityEffect {
    /// Removes hit points from the target.
    #[default]
    Damage,
    /// Restores hit points to the target.
    Heal,
    /// Grants the user a timed buff status.
    Buff,
    /// Places a timed debuff status on the target.
    Debuff,
    /// Grants the user a status named after the ability.
    Status,
}

/// Immutable ability definition looked up by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique identifier.
    pub id: String,
    /// Display name; the identifier is used when empty.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Action points spent on use.
    #[serde(default)]
    pub ap_cost: u32,
    /// Energy spent on use.
    #[serde(default)]
    pub energy_cost: u32,
    /// Manhattan reach of the ability.
    #[serde(default = "default_range")]
    pub range: u32,
    /// Who the ability may be aimed at.
    #[serde(default)]
    pub target: AbilityTarget,
    /// What the ability does.
    #[serde(default)]
    pub effect: AbilityEffect,
    /// Magnitude of the effect.
    #[serde(default)]
    pub power: u32,
}

impl AbilityDefinition {
    /// Name shown in narration, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Collectable item definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Terrain type shared by every cell painted with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainDefinition {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Action points needed to enter the cell. Values below one count as one.
    #[serde(default = "default_movement_cost")]
    pub movement_cost: u32,
    /// Added to the defense of an entity standing on the cell.
    #[serde(default, alias = "defense_bonus")]
    pub defense_modifier: i32,
    /// Added to the dodge score of an entity standing on the cell.
    #[serde(default, alias = "evasion_bonus")]
    pub dodge_modifier: i32,
    /// Whether entities may enter the cell.
    #[serde(default)]
    pub blocks_movement: bool,
    /// Whether the cell obstructs sight.
    #[serde(default, alias = "blocks_los")]
    pub blocks_line_of_sight: bool,
}

/// Kinds of special tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialTileKind {
    /// Plain cell.
    #[default]
    None,
    /// Damages entities entering the cell.
    Trap,
    /// Heals entities entering the cell.
    Heal,
    /// Teleports entities entering the cell.
    Portal,
    /// Mission waypoint.
    Objective,
    /// Collectable item.
    Item,
}

/// Special behaviour attached to a single cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTileDefinition {
    /// Kind of special tile.
    #[serde(rename = "type", default)]
    pub kind: SpecialTileKind,
    /// Cell holding the special tile.
    #[serde(flatten)]
    pub cell: CellCoord,
    /// Magnitude used by traps and healing tiles.
    #[serde(default)]
    pub value: u32,
    /// Item identifier, or an `"x,y"` destination for portals.
    #[serde(default)]
    pub target: Option<String>,
}

impl SpecialTileDefinition {
    /// Parses the portal destination stored in the target reference.
    #[must_use]
    pub fn portal_destination(&self) -> Option<CellCoord> {
        let target = self.target.as_deref()?;
        let (column, row) = target.split_once(',')?;
        let column = column.trim().parse().ok()?;
        let row = row.trim().parse().ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Criterion an objective is judged by.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Defeat a number of enemies, optionally a specific one.
    DefeatEnemies {
        /// Enemy identifier to match; any enemy when absent or empty.
        #[serde(default)]
        target: Option<String>,
        /// Number of defeats required; zero means any single defeat.
        #[serde(default)]
        amount: u32,
    },
    /// Talk to a non-player character.
    TalkToNpc {
        /// Character identifier to match; any character when absent or empty.
        #[serde(default)]
        target: Option<String>,
    },
    /// Collect a number of items, optionally a specific one.
    CollectItem {
        /// Item identifier to match; any item when absent or empty.
        #[serde(default)]
        target: Option<String>,
        /// Number of items required; zero means any single item.
        #[serde(default)]
        amount: u32,
    },
    /// Step onto a specific cell.
    ReachTile {
        /// Cell that must be reached.
        cell: CellCoord,
    },
    /// Survive a number of round boundaries.
    SurviveTurns {
        /// Number of rounds to survive.
        #[serde(default)]
        turns: u32,
    },
}

/// Immutable objective definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectiveDefinition {
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Criterion the objective is judged by.
    #[serde(flatten)]
    pub kind: ObjectiveKind,
}

/// Entity placement on a map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnDefinition {
    /// Identifier of the entity definition to spawn.
    pub entity: String,
    /// Cell the entity starts on.
    #[serde(flatten)]
    pub cell: CellCoord,
}

/// Immutable map layout and mission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Terrain identifiers in row-major order. Missing entries are `plain`.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// Round after which the mission ends; zero disables the limit.
    #[serde(default)]
    pub turn_limit: u32,
    /// Special tiles placed on the map.
    #[serde(default, alias = "special_tiles")]
    pub specials: Vec<SpecialTileDefinition>,
    /// Mission objectives.
    #[serde(default)]
    pub objectives: Vec<ObjectiveDefinition>,
    /// Player-controlled spawns.
    #[serde(default)]
    pub players: Vec<SpawnDefinition>,
    /// Adversary spawns.
    #[serde(default)]
    pub enemies: Vec<SpawnDefinition>,
    /// Neutral character spawns.
    #[serde(default)]
    pub npcs: Vec<SpawnDefinition>,
}

impl MapDefinition {
    /// Name shown in narration, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Terrain identifier painted at the provided cell.
    #[must_use]
    pub fn terrain_id(&self, cell: CellCoord) -> &str {
        let row = usize::try_from(cell.row()).ok();
        let column = usize::try_from(cell.column()).ok();
        row.zip(column)
            .and_then(|(row, column)| self.rows.get(row)?.get(column))
            .map_or(FALLBACK_TERRAIN_ID, String::as_str)
    }

    fn spawns(&self) -> impl Iterator<Item = &SpawnDefinition> {
        self.players
            .iter()
            .chain(self.enemies.iter())
            .chain(self.npcs.iter())
    }
}

/// Raw content as delivered by a data file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPack {
    /// Terrain types.
    #[serde(alias = "terrain_types")]
    pub terrain: Vec<TerrainDefinition>,
    /// Ability definitions.
    pub abilities: Vec<AbilityDefinition>,
    /// Item definitions.
    pub items: Vec<ItemDefinition>,
    /// Entity templates.
    pub entities: Vec<EntityDefinition>,
    /// Maps and their missions.
    pub maps: Vec<MapDefinition>,
}

/// Indexed, validated content registry.
#[derive(Clone, Debug)]
pub struct Content {
    terrain: BTreeMap<String, TerrainDefinition>,
    fallback_terrain: TerrainDefinition,
    abilities: BTreeMap<String, AbilityDefinition>,
    items: BTreeMap<String, ItemDefinition>,
    entities: BTreeMap<String, EntityDefinition>,
    maps: BTreeMap<String, MapDefinition>,
}

impl Content {
    /// Indexes a content pack, rejecting packs that break the content contract.
    ///
    /// Every ability known by an entity and every entity named by a spawn must
    /// resolve, and every spawn must lie on its map.
    pub fn from_pack(pack: ContentPack) -> Result<Self, ContentError> {
        let fallback_terrain = pack
            .terrain
            .iter()
            .find(|terrain| terrain.id == FALLBACK_TERRAIN_ID)
            .or_else(|| pack.terrain.first())
            .cloned()
            .ok_or(ContentError::MissingTerrain)?;

        let content = Self {
            terrain: index("terrain", pack.terrain, |terrain| &terrain.id)?,
            fallback_terrain,
            abilities: index("ability", pack.abilities, |ability| &ability.id)?,
            items: index("item", pack.items, |item| &item.id)?,
            entities: index("entity", pack.entities, |entity| &entity.id)?,
            maps: index("map", pack.maps, |map| &map.id)?,
        };

        for entity in content.entities.values() {
            for ability in &entity.abilities {
                let _ = content.ability(ability)?;
            }
        }

        for map in content.maps.values() {
            if map.width == 0 || map.height == 0 {
                return Err(ContentError::EmptyMap(map.id.clone()));
            }
            for spawn in map.spawns() {
                let _ = content.entity(&spawn.entity)?;
                if spawn.cell.column() >= map.width || spawn.cell.row() >= map.height {
                    return Err(ContentError::SpawnOutOfBounds {
                        map: map.id.clone(),
                        entity: spawn.entity.clone(),
                        cell: spawn.cell,
                    });
                }
            }
        }

        Ok(content)
    }

    /// Resolves a terrain identifier, falling back to the default terrain.
    #[must_use]
    pub fn terrain_or_fallback(&self, id: &str) -> &TerrainDefinition {
        self.terrain.get(id).unwrap_or(&self.fallback_terrain)
    }

    /// Resolves an ability identifier.
    pub fn ability(&self, id: &str) -> Result<&AbilityDefinition, ContentError> {
        self.abilities
            .get(id)
            .ok_or_else(|| ContentError::UnknownAbility(id.to_owned()))
    }

    /// Resolves an entity identifier.
    pub fn entity(&self, id: &str) -> Result<&EntityDefinition, ContentError> {
        self.entities
            .get(id)
            .ok_or_else(|| ContentError::UnknownEntity(id.to_owned()))
    }

    /// Resolves a map identifier.
    pub fn map(&self, id: &str) -> Result<&MapDefinition, ContentError> {
        self.maps
            .get(id)
            .ok_or_else(|| ContentError::UnknownMap(id.to_owned()))
    }

    /// Looks up an item definition.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    /// Iterator over map definitions ordered by identifier.
    pub fn maps(&self) -> impl Iterator<Item = &MapDefinition> {
        self.maps.values()
    }
}

fn index<T, F>(
    category: &'static str,
    definitions: Vec<T>,
    id_of: F,
) -> Result<BTreeMap<String, T>, ContentError>
where
    F: Fn(&T) -> &String,
{
    let mut indexed = BTreeMap::new();
    for definition in definitions {
        let id = id_of(&definition).clone();
        if indexed.contains_key(&id) {
            return Err(ContentError::DuplicateId { category, id });
        }
        let _ = indexed.insert(id, definition);
    }
    Ok(indexed)
}

fn default_attributes() -> Attributes {
    Attributes::new(3, 3, 3, 3)
}

const fn default_max_hp() -> u32 {
    100
}

const fn default_max_energy() -> u32 {
    50
}

const fn default_base_attack() -> i32 {
    10
}

const fn default_range() -> u32 {
    1
}

const fn default_movement_cost() -> u32 {
    1
}
