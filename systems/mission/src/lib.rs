#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Mission objective tracking.
//!
//! Handlers scan the whole objective list and update every objective that
//! matches, emitting `Event::ObjectiveCompleted` the first time each one
//! completes.

use skirmish_core::{CellCoord, Event, ObjectiveDefinition, ObjectiveKind, ObjectiveRecord};

/// Progress of a single objective.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectiveState {
    definition: ObjectiveDefinition,
    progress: u32,
    completed: bool,
}

impl ObjectiveState {
    /// Definition the objective is judged by.
    #[must_use]
    pub const fn definition(&self) -> &ObjectiveDefinition {
        &self.definition
    }

    /// Matching occurrences counted so far.
    #[must_use]
    pub const fn progress(&self) -> u32 {
        self.progress
    }

    /// Reports whether the objective is complete.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    fn count(&mut self, amount: u32) {
        self.progress = self.progress.saturating_add(1);
        if amount == 0 || self.progress >= amount {
            self.completed = true;
        }
    }

    fn settle(&mut self) {
        self.progress = 1;
        self.completed = true;
    }
}

/// Ordered list of objectives for the map being played.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mission {
    objectives: Vec<ObjectiveState>,
}

impl Mission {
    /// Creates a mission with every objective pending.
    #[must_use]
    pub fn new<'a, I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = &'a ObjectiveDefinition>,
    {
        Self {
            objectives: definitions
                .into_iter()
                .map(|definition| ObjectiveState {
                    definition: definition.clone(),
                    progress: 0,
                    completed: false,
                })
                .collect(),
        }
    }

    /// Objectives in mission order.
    #[must_use]
    pub fn objectives(&self) -> &[ObjectiveState] {
        &self.objectives
    }

    /// Number of completed objectives.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.objectives
            .iter()
            .filter(|objective| objective.completed)
            .count()
    }

    /// Reports whether the mission has objectives and all of them are complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(|objective| objective.completed)
    }

    /// Records a defeated enemy. An empty identifier matches only wildcard objectives.
    pub fn register_enemy_defeated(&mut self, enemy: &str, out: &mut Vec<Event>) {
        self.update(out, |objective| {
            let amount = match &objective.definition.kind {
                ObjectiveKind::DefeatEnemies { target, amount }
                    if matches_target(target, enemy) =>
                {
                    *amount
                }
                _ => return,
            };
            objective.count(amount);
        });
    }

    /// Records a conversation with a non-player character.
    pub fn register_npc_conversation(&mut self, npc: &str, out: &mut Vec<Event>) {
        self.update(out, |objective| {
            if matches!(
                &objective.definition.kind,
                ObjectiveKind::TalkToNpc { target } if matches_target(target, npc)
            ) {
                objective.settle();
            }
        });
    }

    /// Records a collected item.
    pub fn register_item_collected(&mut self, item: &str, out: &mut Vec<Event>) {
        self.update(out, |objective| {
            let amount = match &objective.definition.kind {
                ObjectiveKind::CollectItem { target, amount } if matches_target(target, item) => {
                    *amount
                }
                _ => return,
            };
            objective.count(amount);
        });
    }

    /// Records an entity stepping onto a cell.
    pub fn register_tile_reached(&mut self, cell: CellCoord, out: &mut Vec<Event>) {
        self.update(out, |objective| {
            if objective.definition.kind == (ObjectiveKind::ReachTile { cell }) {
                objective.settle();
            }
        });
    }

    /// Records a completed round.
    ///
    /// An objective asking to survive zero turns completes on the first call.
    pub fn register_survived_turn(&mut self, out: &mut Vec<Event>) {
        self.update(out, |objective| {
            if let ObjectiveKind::SurviveTurns { turns } = objective.definition.kind {
                objective.count(turns);
            }
        });
    }

    /// Per-objective records for the diagnostic snapshot.
    #[must_use]
    pub fn records(&self) -> Vec<ObjectiveRecord> {
        self.objectives
            .iter()
            .map(|objective| ObjectiveRecord {
                desc: objective.definition.description.clone(),
                completed: objective.completed,
            })
            .collect()
    }

    fn update<F>(&mut self, out: &mut Vec<Event>, mut handler: F)
    where
        F: FnMut(&mut ObjectiveState),
    {
        for (index, objective) in self.objectives.iter_mut().enumerate() {
            let was_completed = objective.completed;
            handler(objective);
            if objective.completed && !was_completed {
                out.push(Event::ObjectiveCompleted { index });
            }
        }
    }
}

fn matches_target(target: &Option<String>, id: &str) -> bool {
    target
        .as_deref()
        .map_or(true, |target| target.is_empty() || target == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objective(kind: ObjectiveKind) -> ObjectiveDefinition {
        ObjectiveDefinition {
            description: String::from("objective"),
            kind,
        }
    }

    fn defeat(target: Option<&str>, amount: u32) -> ObjectiveDefinition {
        objective(ObjectiveKind::DefeatEnemies {
            target: target.map(str::to_owned),
            amount,
        })
    }

    #[test]
    fn empty_mission_is_never_complete() {
        let mut mission = Mission::default();
        let mut events = Vec::new();
        mission.register_survived_turn(&mut events);

        assert!(!mission.is_complete());
        assert!(events.is_empty());
    }

    #[test]
    fn mission_completes_only_when_every_objective_does() {
        let definitions = [
            objective(ObjectiveKind::TalkToNpc {
                target: Some("elder".to_owned()),
            }),
            objective(ObjectiveKind::ReachTile {
                cell: CellCoord::new(4, 1),
            }),
        ];
        let mut mission = Mission::new(&definitions);
        let mut events = Vec::new();

        mission.register_npc_conversation("stranger", &mut events);
        mission.register_npc_conversation("elder", &mut events);
        assert!(!mission.is_complete());
        assert_eq!(mission.completed_count(), 1);

        mission.register_tile_reached(CellCoord::new(1, 4), &mut events);
        assert!(!mission.is_complete());

        mission.register_tile_reached(CellCoord::new(4, 1), &mut events);
        assert!(mission.is_complete());
        assert_eq!(
            events,
            vec![
                Event::ObjectiveCompleted { index: 0 },
                Event::ObjectiveCompleted { index: 1 }
            ]
        );
    }

    #[test]
    fn wildcard_defeat_needs_exactly_the_amount() {
        let mut mission = Mission::new(&[defeat(Some(""), 2)]);
        let mut events = Vec::new();

        mission.register_enemy_defeated("goblin", &mut events);
        assert!(!mission.is_complete());
        assert_eq!(mission.objectives()[0].progress(), 1);

        mission.register_enemy_defeated("orc", &mut events);
        assert!(mission.is_complete());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn targeted_defeat_ignores_other_enemies() {
        let mut mission = Mission::new(&[defeat(Some("warlord"), 1), defeat(None, 0)]);
        let mut events = Vec::new();

        mission.register_enemy_defeated("goblin", &mut events);
        assert!(!mission.objectives()[0].is_completed());
        assert!(mission.objectives()[1].is_completed());

        mission.register_enemy_defeated("warlord", &mut events);
        assert!(mission.is_complete());
    }

    #[test]
    fn anonymous_defeat_only_counts_for_wildcards() {
        let mut mission = Mission::new(&[defeat(Some("warlord"), 1), defeat(None, 1)]);
        let mut events = Vec::new();

        mission.register_enemy_defeated("", &mut events);

        assert_eq!(events, vec![Event::ObjectiveCompleted { index: 1 }]);
    }

    #[test]
    fn item_collection_counts_matching_items() {
        let mut mission = Mission::new(&[objective(ObjectiveKind::CollectItem {
            target: Some("relic".to_owned()),
            amount: 2,
        })]);
        let mut events = Vec::new();

        mission.register_item_collected("coin", &mut events);
        mission.register_item_collected("relic", &mut events);
        assert!(!mission.is_complete());
        mission.register_item_collected("relic", &mut events);
        assert!(mission.is_complete());
    }

    #[test]
    fn surviving_zero_turns_completes_on_first_round() {
        let mut mission = Mission::new(&[objective(ObjectiveKind::SurviveTurns { turns: 0 })]);
        let mut events = Vec::new();

        mission.register_survived_turn(&mut events);

        assert!(mission.is_complete());
        assert_eq!(mission.objectives()[0].progress(), 1);
    }

    #[test]
    fn surviving_counts_rounds() {
        let mut mission = Mission::new(&[objective(ObjectiveKind::SurviveTurns { turns: 3 })]);
        let mut events = Vec::new();

        mission.register_survived_turn(&mut events);
        mission.register_survived_turn(&mut events);
        assert!(!mission.is_complete());
        mission.register_survived_turn(&mut events);
        assert!(mission.is_complete());
    }

    #[test]
    fn completion_is_reported_once() {
        let mut mission = Mission::new(&[objective(ObjectiveKind::TalkToNpc { target: None })]);
        let mut events = Vec::new();

        mission.register_npc_conversation("elder", &mut events);
        mission.register_npc_conversation("elder", &mut events);

        assert_eq!(events.len(), 1);
        assert_eq!(mission.objectives()[0].progress(), 1);
    }

    #[test]
    fn records_mirror_objective_state() {
        let mut mission = Mission::new(&[defeat(None, 0)]);
        let mut events = Vec::new();
        mission.register_enemy_defeated("any", &mut events);

        let records = mission.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].desc, "objective");
        assert!(records[0].completed);
    }
}
