#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates a single mission from the first roll to a terminal state.
//!
//! A [`Session`] owns the world, the initiative order, the mission tracker
//! and the die roller. Player-controlled actors are driven through
//! [`Session::apply`], one [`Command`] at a time; adversaries are played by
//! the autopilot inside [`Session::update`], which also ticks statuses and
//! checks for victory, defeat and turn-limit expiry.

mod config;

pub use config::SessionConfig;

use skirmish_core::{
    AbilityTarget, CellCoord, Command, Content, ContentError, DiagnosticSnapshot, EntityId,
    EntityRecord, Event, Faction, Outcome, RejectionReason, SpecialTileKind,
};
use skirmish_system_autopilot::Autopilot;
use skirmish_system_combat::{perform_basic_attack, use_ability, AbilityOutcome};
use skirmish_system_dice::Roll;
use skirmish_system_mission::Mission;
use skirmish_system_reachability::{movement_costs, range};
use skirmish_system_turn_order::TurnOrder;
use skirmish_world::{query, World};
use tracing::{debug, info};

/// Stage of the active turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The active actor must roll action points before acting.
    AwaitingRoll,
    /// The active actor may spend its action points.
    ActionSelection,
    /// The simulation ended with the carried outcome.
    GameOver(Outcome),
}

/// A running mission.
#[derive(Debug)]
pub struct Session<R> {
    content: Content,
    config: SessionConfig,
    world: World,
    turns: TurnOrder,
    mission: Mission,
    autopilot: Autopilot,
    dice: R,
    phase: Phase,
}

impl<R: Roll> Session<R> {
    /// Starts the mission on `map_id`.
    ///
    /// Players and enemies join the initiative order; neutral characters
    /// never take turns. The first actor's turn begins immediately.
    pub fn new(
        content: &Content,
        map_id: &str,
        config: SessionConfig,
        dice: R,
    ) -> Result<Self, ContentError> {
        let map = content.map(map_id)?;
        let mut world = World::from_definition(content, map, config.log_capacity)?;
        let mission = Mission::new(&map.objectives);

        let mut turns = TurnOrder::new();
        let roster = query::roster(&world);
        turns.set_participants(world.combatants().iter().filter_map(|id| {
            roster
                .get(*id)
                .map(|entity| (*id, entity.attributes().agility))
        }));

        world.narrate(format!("Mission started: {}", world.map_name()));
        info!(
            map = map_id,
            combatants = turns.len(),
            objectives = mission.objectives().len(),
            "mission started"
        );

        let phase = if turns.is_empty() {
            Phase::GameOver(Outcome::NoCombatants)
        } else {
            Phase::AwaitingRoll
        };

        Ok(Self {
            content: content.clone(),
            config,
            world,
            turns,
            mission,
            autopilot: Autopilot::new(config.attack_cost),
            dice,
            phase,
        })
    }

    /// Events describing the state the session opened in.
    #[must_use]
    pub fn opening_events(&self) -> Vec<Event> {
        let mut events = vec![Event::MissionStarted {
            map: self.world.map_id().to_owned(),
        }];
        if let Some(entity) = self.turns.current() {
            events.push(Event::TurnStarted {
                entity,
                round: self.turns.round(),
            });
        }
        if let Phase::GameOver(outcome) = self.phase {
            events.push(Event::SimulationEnded { outcome });
        }
        events
    }

    /// Current stage of the active turn.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Outcome of the simulation once it ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::GameOver(outcome) => Some(outcome),
            Phase::AwaitingRoll | Phase::ActionSelection => None,
        }
    }

    /// Entity holding the current turn.
    #[must_use]
    pub fn current_actor(&self) -> Option<EntityId> {
        self.turns.current()
    }

    /// Current round, starting at one.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.turns.round()
    }

    /// Read-only access to the battlefield.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the initiative order.
    #[must_use]
    pub const fn turn_order(&self) -> &TurnOrder {
        &self.turns
    }

    /// Read-only access to the mission objectives.
    #[must_use]
    pub const fn mission(&self) -> &Mission {
        &self.mission
    }

    /// Rule constants the session runs with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Reports whether the active actor is played by the autopilot.
    #[must_use]
    pub fn is_automated_turn(&self) -> bool {
        self.turns
            .current()
            .is_some_and(|actor| self.faction_of(actor) == Some(Faction::Enemies))
    }

    /// Command the autopilot would choose for the active actor.
    ///
    /// Adapters use this to play player-controlled actors unattended.
    #[must_use]
    pub fn suggest_command(&self) -> Command {
        match (self.phase, self.turns.current()) {
            (Phase::AwaitingRoll, Some(_)) => Command::RollActionPoints,
            (Phase::ActionSelection, Some(actor)) => self.autopilot.next_command(
                query::board(&self.world),
                query::roster(&self.world),
                actor,
            ),
            _ => Command::EndTurn,
        }
    }

    /// Executes a command on behalf of the active player-controlled actor.
    ///
    /// Illegal commands leave the session untouched and emit a single
    /// [`Event::CommandRejected`].
    pub fn apply(&mut self, command: Command, out: &mut Vec<Event>) {
        if let Phase::GameOver(_) = self.phase {
            reject(RejectionReason::GameOver, out);
            return;
        }
        let Some(actor) = self.turns.current() else {
            reject(RejectionReason::NoActiveEntity, out);
            return;
        };
        if self.is_automated_turn() {
            reject(RejectionReason::AutomatedTurn, out);
            return;
        }
        if command != Command::EndTurn && !self.is_alive(actor) {
            reject(RejectionReason::NoActiveEntity, out);
            return;
        }

        match command {
            Command::RollActionPoints => self.roll_action_points(actor, out),
            Command::EndTurn => self.end_turn(out),
            action => {
                if self.phase == Phase::AwaitingRoll {
                    reject(RejectionReason::AwaitingRoll, out);
                    return;
                }
                let accepted = match action {
                    Command::Move { to } => self.move_actor(actor, to, true, out),
                    Command::Attack { target } => self.attack(actor, target, out),
                    Command::UseAbility { ability, target } => {
                        self.cast(actor, &ability, target, out)
                    }
                    Command::Interact { cell } => self.interact(actor, cell, out),
                    Command::RollActionPoints | Command::EndTurn => false,
                };
                if accepted && (!self.is_alive(actor) || self.action_points_of(actor) == 0) {
                    self.end_turn(out);
                }
            }
        }
    }

    /// Advances the simulation by one cycle.
    ///
    /// Statuses of every entity tick once, an automated actor plays its
    /// whole turn, and terminal conditions are evaluated.
    pub fn update(&mut self, out: &mut Vec<Event>) {
        if let Phase::GameOver(_) = self.phase {
            return;
        }

        self.world.roster_mut().tick_statuses();

        if self.is_automated_turn() {
            self.play_automated_turn(out);
        }

        self.evaluate(out);
    }

    /// Captures the diagnostic snapshot of the running simulation.
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            map: self.world.map_id().to_owned(),
            turn: self.turns.round(),
            entities: query::roster(&self.world)
                .iter()
                .map(|entity| EntityRecord {
                    id: entity.definition_id().to_owned(),
                    hp: entity.hp(),
                    energy: entity.energy(),
                    level: entity.level(),
                    x: entity.cell().column(),
                    y: entity.cell().row(),
                })
                .collect(),
            objectives: self.mission.records(),
        }
    }

    /// Serializes the diagnostic snapshot as compact JSON.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    fn roll_action_points(&mut self, actor: EntityId, out: &mut Vec<Event>) {
        if self.phase != Phase::AwaitingRoll {
            reject(RejectionReason::AlreadyRolled, out);
            return;
        }

        let rolled = self.dice.roll(self.config.ap_die);
        let Some(entity) = self.world.roster_mut().get_mut(actor) else {
            return;
        };
        let amount = if entity.faction() == Faction::Players {
            let bonus = u32::try_from((entity.attributes().agility / 2).max(0)).unwrap_or(0);
            rolled.saturating_add(bonus)
        } else {
            rolled
        };
        entity.set_action_points(amount);
        let line = format!("{} received {amount} AP", entity.name());
        self.world.narrate(line);

        self.phase = Phase::ActionSelection;
        out.push(Event::ActionPointsRolled {
            entity: actor,
            amount,
        });

        if amount == 0 {
            self.end_turn(out);
        }
    }

    fn move_actor(
        &mut self,
        actor: EntityId,
        to: CellCoord,
        trigger_tiles: bool,
        out: &mut Vec<Event>,
    ) -> bool {
        let roster = query::roster(&self.world);
        let Some(entity) = roster.get(actor) else {
            return false;
        };
        if roster.occupant(to).is_some_and(|other| other.id() != actor) {
            reject(RejectionReason::Occupied, out);
            return false;
        }
        let costs = movement_costs(
            query::board(&self.world),
            roster,
            entity,
            entity.action_points(),
        );
        let Some(cost) = costs.cost(to).filter(|cost| *cost > 0) else {
            reject(RejectionReason::Unreachable, out);
            return false;
        };

        let from = entity.cell();
        let Some(entity) = self.world.roster_mut().get_mut(actor) else {
            return false;
        };
        entity.consume_action_points(cost);
        entity.set_position(to);
        let line = format!("{} moved to ({}, {})", entity.name(), to.column(), to.row());
        self.world.narrate(line);
        out.push(Event::EntityMoved {
            entity: actor,
            from,
            to,
            cost,
        });

        if trigger_tiles {
            self.apply_tile_effect(actor, out);
        }
        true
    }

    fn attack(&mut self, actor: EntityId, target: EntityId, out: &mut Vec<Event>) -> bool {
        let roster = query::roster(&self.world);
        let (Some(attacker), Some(defender)) = (roster.get(actor), roster.get(target)) else {
            reject(RejectionReason::InvalidTarget, out);
            return false;
        };
        if !defender.is_alive() || !attacker.faction().is_hostile_to(defender.faction()) {
            reject(RejectionReason::InvalidTarget, out);
            return false;
        }
        if attacker.cell().manhattan_distance(defender.cell()) > attacker.attack_range() {
            reject(RejectionReason::OutOfRange, out);
            return false;
        }
        if !attacker.has_action_points(self.config.attack_cost) {
            reject(RejectionReason::InsufficientActionPoints, out);
            return false;
        }

        self.resolve_attack(actor, target, out);
        true
    }

    fn resolve_attack(&mut self, actor: EntityId, target: EntityId, out: &mut Vec<Event>) {
        let parts = self.world.split_mut();
        let Some((attacker, defender)) = parts.roster.pair_mut(actor, target) else {
            return;
        };
        attacker.consume_action_points(self.config.attack_cost);
        let outcome = perform_basic_attack(
            attacker,
            defender,
            parts.board,
            &mut self.dice,
            parts.log,
        );
        let defeated_enemy = (outcome.defeated() && defender.faction() == Faction::Enemies)
            .then(|| defender.definition_id().to_owned());

        out.push(Event::AttackResolved {
            attacker: actor,
            defender: target,
            outcome,
        });
        if outcome.defeated() {
            out.push(Event::EntityDefeated { entity: target });
        }
        if let Some(enemy) = defeated_enemy {
            self.mission.register_enemy_defeated(&enemy, out);
        }
    }

    fn cast(
        &mut self,
        actor: EntityId,
        ability_id: &str,
        target_cell: Option<CellCoord>,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(entity) = query::entity(&self.world, actor) else {
            return false;
        };
        if !entity.knows_ability(ability_id) {
            reject(RejectionReason::UnknownAbility, out);
            return false;
        }
        let Ok(ability) = self.content.ability(ability_id) else {
            reject(RejectionReason::UnknownAbility, out);
            return false;
        };

        let target = if ability.target == AbilityTarget::SelfOnly {
            Some(actor)
        } else {
            let Some(cell) = target_cell else {
                reject(RejectionReason::InvalidTarget, out);
                return false;
            };
            if !range(query::board(&self.world), entity.cell(), ability.range).contains(&cell) {
                reject(RejectionReason::OutOfRange, out);
                return false;
            }
            query::roster(&self.world).occupant(cell).map(|occupant| occupant.id())
        };

        let parts = self.world.split_mut();
        match use_ability(ability, parts.roster, actor, target, parts.log) {
            AbilityOutcome::Rejected(reason) => {
                reject(reason, out);
                false
            }
            AbilityOutcome::Applied { target, defeated } => {
                out.push(Event::AbilityUsed {
                    user: actor,
                    ability: ability.id.clone(),
                    target,
                });
                if let Some(victim) = target.filter(|_| defeated) {
                    out.push(Event::EntityDefeated { entity: victim });
                    let defeated_enemy = query::entity(&self.world, victim)
                        .filter(|entity| entity.faction() == Faction::Enemies)
                        .map(|entity| entity.definition_id().to_owned());
                    if let Some(enemy) = defeated_enemy {
                        self.mission.register_enemy_defeated(&enemy, out);
                    }
                }
                true
            }
        }
    }

    fn interact(&mut self, actor: EntityId, cell: CellCoord, out: &mut Vec<Event>) -> bool {
        let Some(entity) = query::entity(&self.world, actor) else {
            return false;
        };
        if !query::board(&self.world).contains(cell) || entity.cell().manhattan_distance(cell) != 1
        {
            reject(RejectionReason::OutOfRange, out);
            return false;
        }

        let npc = query::roster(&self.world)
            .occupant(cell)
            .filter(|occupant| occupant.faction() == Faction::Neutral)
            .map(|occupant| {
                let dialog = occupant.dialog().unwrap_or_default();
                (
                    occupant.id(),
                    occupant.definition_id().to_owned(),
                    format!("{}: \"{dialog}\"", occupant.name()),
                )
            });
        if let Some((npc, npc_definition, line)) = npc {
            self.world.narrate(line);
            out.push(Event::ConversationHeld {
                speaker: actor,
                npc,
            });
            self.mission.register_npc_conversation(&npc_definition, out);
            return true;
        }

        if query::board(&self.world).special_kind(cell) == SpecialTileKind::Item {
            self.collect_item(actor, cell, out);
            return true;
        }

        reject(RejectionReason::NothingToInteract, out);
        false
    }

    fn collect_item(&mut self, actor: EntityId, cell: CellCoord, out: &mut Vec<Event>) {
        let item = self
            .world
            .board_mut()
            .clear_special(cell)
            .and_then(|special| special.target);
        let name = self.name_of(actor);
        let label = item
            .as_deref()
            .and_then(|id| self.content.item(id))
            .map_or("an item", |definition| definition.name.as_str());
        self.world.narrate(format!("{name} collected {label}."));
        self.mission
            .register_item_collected(item.as_deref().unwrap_or_default(), out);
        out.push(Event::ItemCollected {
            entity: actor,
            item,
        });
    }

    fn apply_tile_effect(&mut self, actor: EntityId, out: &mut Vec<Event>) {
        let Some(entity) = query::entity(&self.world, actor) else {
            return;
        };
        let cell = entity.cell();
        let Some(special) = query::board(&self.world).special(cell).cloned() else {
            return;
        };
        if special.kind == SpecialTileKind::None {
            return;
        }
        out.push(Event::TileTriggered {
            entity: actor,
            cell,
            kind: special.kind,
        });

        match special.kind {
            SpecialTileKind::None => {}
            SpecialTileKind::Trap => {
                let Some(entity) = self.world.roster_mut().get_mut(actor) else {
                    return;
                };
                entity.take_damage(special.value);
                let defeated = !entity.is_alive();
                let line = format!("{} took {} trap damage.", entity.name(), special.value);
                self.world.narrate(line);
                if defeated {
                    out.push(Event::EntityDefeated { entity: actor });
                }
            }
            SpecialTileKind::Heal => {
                let Some(entity) = self.world.roster_mut().get_mut(actor) else {
                    return;
                };
                entity.heal(special.value);
                let line = format!("{} recovered {} HP.", entity.name(), special.value);
                self.world.narrate(line);
            }
            SpecialTileKind::Portal => {
                let destination = special.portal_destination().filter(|destination| {
                    query::board(&self.world).contains(*destination)
                        && !query::roster(&self.world).is_occupied(*destination)
                });
                let Some(destination) = destination else {
                    return;
                };
                let Some(entity) = self.world.roster_mut().get_mut(actor) else {
                    return;
                };
                entity.set_position(destination);
                let line = format!("A portal carried {} away.", entity.name());
                self.world.narrate(line);
                out.push(Event::EntityMoved {
                    entity: actor,
                    from: cell,
                    to: destination,
                    cost: 0,
                });
            }
            SpecialTileKind::Item => self.collect_item(actor, cell, out),
            SpecialTileKind::Objective => self.mission.register_tile_reached(cell, out),
        }
    }

    fn play_automated_turn(&mut self, out: &mut Vec<Event>) {
        let Some(actor) = self.turns.current() else {
            return;
        };

        let rolled = self.dice.roll(self.config.ap_die);
        if let Some(entity) = self.world.roster_mut().get_mut(actor) {
            entity.set_action_points(rolled);
            let line = format!("{} (AI) gained {rolled} AP", entity.name());
            self.world.narrate(line);
        }
        self.phase = Phase::ActionSelection;
        out.push(Event::ActionPointsRolled {
            entity: actor,
            amount: rolled,
        });
        debug!(entity = actor.get(), action_points = rolled, "automated turn");

        loop {
            let before = self.action_points_of(actor);
            let command = self.autopilot.next_command(
                query::board(&self.world),
                query::roster(&self.world),
                actor,
            );
            let progressed = match command {
                Command::Attack { target } => self.attack(actor, target, out),
                Command::Move { to } => self.move_actor(actor, to, false, out),
                _ => false,
            };
            // Every iteration must spend action points.
            if !progressed || self.action_points_of(actor) >= before {
                break;
            }
        }

        self.end_turn(out);
    }

    fn end_turn(&mut self, out: &mut Vec<Event>) {
        if let Some(previous) = self.turns.current() {
            if let Some(entity) = self.world.roster_mut().get_mut(previous) {
                entity.set_action_points(0);
            }
        }

        if self.turns.next_turn() {
            let round = self.turns.round();
            out.push(Event::RoundAdvanced { round });
            self.mission.register_survived_turn(out);
        }
        let roster = query::roster(&self.world);
        self.turns
            .remove_eliminated(|id| roster.get(id).is_some_and(|entity| entity.is_alive()));

        match self.turns.current() {
            Some(next) => {
                self.phase = Phase::AwaitingRoll;
                out.push(Event::TurnStarted {
                    entity: next,
                    round: self.turns.round(),
                });
                debug!(entity = next.get(), round = self.turns.round(), "turn started");
            }
            None => self.finish(Outcome::NoCombatants, out),
        }
    }

    fn evaluate(&mut self, out: &mut Vec<Event>) {
        if let Phase::GameOver(_) = self.phase {
            return;
        }

        if !query::faction_alive(&self.world, Faction::Players) {
            self.world.narrate("Defeat! Every hero has fallen.");
            self.finish(Outcome::Defeat, out);
            return;
        }

        if !query::faction_alive(&self.world, Faction::Enemies) {
            self.mission.register_enemy_defeated("", out);
        }

        if self.mission.is_complete() {
            self.world.narrate("Victory! All objectives complete.");
            self.finish(Outcome::Victory, out);
            return;
        }

        let limit = self.world.turn_limit();
        if limit > 0 && self.turns.round() > limit {
            self.world.narrate("The battle ended: turn limit reached.");
            self.finish(Outcome::TurnLimitReached, out);
        }
    }

    fn finish(&mut self, outcome: Outcome, out: &mut Vec<Event>) {
        self.phase = Phase::GameOver(outcome);
        out.push(Event::SimulationEnded { outcome });

        match self.snapshot_json() {
            Ok(state) => {
                info!(?outcome, round = self.turns.round(), %state, "simulation ended");
                self.world.narrate(format!("Serialized state: {state}"));
            }
            Err(error) => {
                info!(?outcome, %error, "simulation ended without a snapshot");
            }
        }
    }

    fn faction_of(&self, id: EntityId) -> Option<Faction> {
        query::entity(&self.world, id).map(|entity| entity.faction())
    }

    fn is_alive(&self, id: EntityId) -> bool {
        query::entity(&self.world, id).is_some_and(|entity| entity.is_alive())
    }

    fn action_points_of(&self, id: EntityId) -> u32 {
        query::entity(&self.world, id).map_or(0, |entity| entity.action_points())
    }

    fn name_of(&self, id: EntityId) -> String {
        query::entity(&self.world, id)
            .map(|entity| entity.name().to_owned())
            .unwrap_or_default()
    }
}

fn reject(reason: RejectionReason, out: &mut Vec<Event>) {
    debug!(?reason, "command rejected");
    out.push(Event::CommandRejected { reason });
}
