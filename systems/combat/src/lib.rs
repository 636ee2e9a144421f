#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Basic attack and ability resolution.
//!
//! Every random draw comes from the caller's [`Roll`] source, so a session
//! that owns a seeded roller replays identical fights.

use skirmish_core::{AbilityDefinition, AbilityEffect, AttackOutcome, EntityId, RejectionReason};
use skirmish_system_dice::Roll;
use skirmish_world::{Board, Entity, EventLog, Roster};

/// Experience granted to an attacker for each basic-attack kill.
pub const KILL_EXPERIENCE: u32 = 40;

const DODGE_DIE: u32 = 100;
const DAMAGE_DIE: u32 = 6;
const BUFF_DURATION: u32 = 3;
const DEBUFF_DURATION: u32 = 3;
const STATUS_DURATION: u32 = 2;

/// Result of attempting to use an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityOutcome {
    /// Costs were paid and the effect resolved.
    Applied {
        /// Entity the effect landed on, if any.
        target: Option<EntityId>,
        /// Whether the effect took the target from alive to dead.
        defeated: bool,
    },
    /// Nothing was spent or changed.
    Rejected(RejectionReason),
}

/// Resolves a basic attack.
///
/// The defender first gets a dodge check of `agility * 2` plus the terrain
/// dodge modifier against a d100. A hit deals at least one point of damage
/// and a kill grants the attacker [`KILL_EXPERIENCE`]. Attacks involving a
/// dead party are ignored without drawing any rolls.
pub fn perform_basic_attack<R: Roll>(
    attacker: &mut Entity,
    defender: &mut Entity,
    board: &Board,
    dice: &mut R,
    log: &mut EventLog,
) -> AttackOutcome {
    if !attacker.is_alive() || !defender.is_alive() {
        return AttackOutcome::Ignored;
    }

    if dodged(defender, board, dice) {
        log.push(format!("{} dodged the attack!", defender.name()));
        return AttackOutcome::Dodged;
    }

    let attack = i64::from(attacker.base_attack())
        + i64::from(attacker.attributes().strength) * 2
        + i64::from(dice.roll(DAMAGE_DIE));
    let defense = i64::from(defender.attributes().defense)
        + i64::from(board.defense_modifier(defender.cell()));
    let damage = u32::try_from((attack - defense).max(1)).unwrap_or(u32::MAX);

    defender.take_damage(damage);
    log.push(format!(
        "{} dealt {damage} damage to {}",
        attacker.name(),
        defender.name()
    ));

    let defeated = !defender.is_alive();
    if defeated {
        log.push(format!("{} has been defeated.", defender.name()));
        let _ = attacker.grant_experience(KILL_EXPERIENCE);
    }

    AttackOutcome::Hit { damage, defeated }
}

fn dodged<R: Roll>(defender: &Entity, board: &Board, dice: &mut R) -> bool {
    let score = i64::from(defender.attributes().agility) * 2
        + i64::from(board.dodge_modifier(defender.cell()));
    i64::from(dice.roll(DODGE_DIE)) <= score
}

/// Pays for and applies an ability.
///
/// The user must afford both the action point and energy costs, otherwise
/// nothing changes. Once paid, effects that need a target are skipped when
/// `target` is `None` or names no entity; the costs stay spent. The target
/// may be the user itself.
pub fn use_ability(
    ability: &AbilityDefinition,
    roster: &mut Roster,
    user: EntityId,
    target: Option<EntityId>,
    log: &mut EventLog,
) -> AbilityOutcome {
    let Some(caster) = roster.get_mut(user) else {
        return AbilityOutcome::Rejected(RejectionReason::NoActiveEntity);
    };
    if !caster.has_action_points(ability.ap_cost) {
        return AbilityOutcome::Rejected(RejectionReason::InsufficientActionPoints);
    }
    if !caster.has_energy(ability.energy_cost) {
        return AbilityOutcome::Rejected(RejectionReason::InsufficientEnergy);
    }

    caster.consume_action_points(ability.ap_cost);
    caster.spend_energy(ability.energy_cost);
    let caster_name = caster.name().to_owned();
    let intelligence = caster.attributes().intelligence;
    let name = ability.display_name();

    let target = target.filter(|id| roster.get(*id).is_some());
    let mut defeated = false;

    let affected = match ability.effect {
        AbilityEffect::Damage => target.and_then(|id| {
            let victim = roster.get_mut(id)?;
            let damage =
                u32::try_from((i64::from(ability.power) + i64::from(intelligence)).max(0))
                    .unwrap_or(u32::MAX);
            let was_alive = victim.is_alive();
            victim.take_damage(damage);
            log.push(format!(
                "{caster_name} used {name} on {} for {damage} damage",
                victim.name()
            ));
            if !victim.is_alive() {
                log.push(format!("{} was eliminated.", victim.name()));
                defeated = was_alive;
            }
            Some(id)
        }),
        AbilityEffect::Heal => target.and_then(|id| {
            let patient = roster.get_mut(id)?;
            patient.heal(ability.power);
            log.push(format!(
                "{caster_name} healed {} for {}",
                patient.name(),
                ability.power
            ));
            Some(id)
        }),
        AbilityEffect::Buff => roster.get_mut(user).map(|caster| {
            caster.add_status(format!("buff_{}", ability.id), BUFF_DURATION);
            log.push(format!("{caster_name} gains a buff from {name}"));
            user
        }),
        AbilityEffect::Debuff => target.and_then(|id| {
            let victim = roster.get_mut(id)?;
            victim.add_status(format!("debuff_{}", ability.id), DEBUFF_DURATION);
            log.push(format!("{} suffers a debuff from {name}", victim.name()));
            Some(id)
        }),
        AbilityEffect::Status => roster.get_mut(user).map(|caster| {
            caster.add_status(ability.id.clone(), STATUS_DURATION);
            log.push(format!("{caster_name} activates {name}"));
            user
        }),
    };

    AbilityOutcome::Applied {
        target: affected,
        defeated,
    }
}
