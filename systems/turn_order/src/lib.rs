#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Initiative sequencing for combatants.
//!
//! The sequencer only stores handles. Callers supply agility when the roster
//! is set and a liveness predicate when eliminating, so the system never
//! touches entity state directly.

use skirmish_core::EntityId;

/// Ordered initiative with a current slot and a round counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOrder {
    participants: Vec<EntityId>,
    current: usize,
    round: u32,
}

impl Default for TurnOrder {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            current: 0,
            round: 1,
        }
    }
}

impl TurnOrder {
    /// Creates an empty sequencer in round one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the roster, ordering it by descending agility.
    ///
    /// Ties keep their input order. The index resets to the first slot and
    /// the round counter to one.
    pub fn set_participants<I>(&mut self, participants: I)
    where
        I: IntoIterator<Item = (EntityId, i32)>,
    {
        let mut ranked: Vec<(EntityId, i32)> = participants.into_iter().collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        self.participants = ranked.into_iter().map(|(id, _)| id).collect();
        self.current = 0;
        self.round = 1;
    }

    /// Entity holding the current turn.
    #[must_use]
    pub fn current(&self) -> Option<EntityId> {
        self.participants.get(self.current).copied()
    }

    /// Passes the turn to the next participant.
    ///
    /// Returns `true` when the order wrapped and a new round began.
    pub fn next_turn(&mut self) -> bool {
        if self.participants.is_empty() {
            return false;
        }
        self.current = (self.current + 1) % self.participants.len();
        if self.current == 0 {
            self.round += 1;
            return true;
        }
        false
    }

    /// Drops every participant the predicate reports as dead.
    ///
    /// Survivors keep their relative order. The index restarts at the first
    /// slot when the participant it pointed at was eliminated or when it falls
    /// past the end of the shortened roster, which can skip a survivor's turn.
    pub fn remove_eliminated<F>(&mut self, mut is_alive: F)
    where
        F: FnMut(EntityId) -> bool,
    {
        let current_eliminated = self.current().is_some_and(|id| !is_alive(id));
        self.participants.retain(|id| is_alive(*id));
        if current_eliminated || self.current >= self.participants.len() {
            self.current = 0;
        }
    }

    /// Current round, starting at one.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Position of the current participant.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Participants in initiative order.
    #[must_use]
    pub fn participants(&self) -> &[EntityId] {
        &self.participants
    }

    /// Number of participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Reports whether nobody is left to act.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> EntityId {
        EntityId::new(value)
    }

    #[test]
    fn orders_by_descending_agility_keeping_ties_stable() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 3), (id(1), 7), (id(2), 3), (id(3), 5)]);

        assert_eq!(order.participants(), &[id(1), id(3), id(0), id(2)]);
        assert_eq!(order.current(), Some(id(1)));
        assert_eq!(order.round(), 1);
    }

    #[test]
    fn wrapping_advances_the_round() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 2), (id(1), 1)]);

        assert!(!order.next_turn());
        assert_eq!(order.current(), Some(id(1)));
        assert!(order.next_turn());
        assert_eq!(order.current(), Some(id(0)));
        assert_eq!(order.round(), 2);
    }

    #[test]
    fn empty_order_is_inert() {
        let mut order = TurnOrder::new();
        assert_eq!(order.current(), None);
        assert!(!order.next_turn());
        assert_eq!(order.round(), 1);
        assert!(order.is_empty());
    }

    #[test]
    fn resetting_participants_restarts_the_count() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 1)]);
        let _ = order.next_turn();
        let _ = order.next_turn();
        assert_eq!(order.round(), 3);

        order.set_participants([(id(4), 1), (id(5), 1)]);
        assert_eq!(order.round(), 1);
        assert_eq!(order.current_index(), 0);
    }

    #[test]
    fn eliminating_the_current_participant_restarts_at_first_slot() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 9), (id(1), 5), (id(2), 1)]);
        let _ = order.next_turn();

        order.remove_eliminated(|entity| entity != id(1));

        assert_eq!(order.participants(), &[id(0), id(2)]);
        assert_eq!(order.current_index(), 0);
        assert_eq!(order.current(), Some(id(0)));
    }

    #[test]
    fn eliminating_before_the_cursor_keeps_the_index() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 9), (id(1), 5), (id(2), 1)]);
        let _ = order.next_turn();

        order.remove_eliminated(|entity| entity != id(0));

        assert_eq!(order.participants(), &[id(1), id(2)]);
        assert_eq!(order.current_index(), 1);
        assert_eq!(order.current(), Some(id(2)));
    }

    #[test]
    fn index_past_the_end_restarts_at_first_slot() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 9), (id(1), 5), (id(2), 1)]);
        let _ = order.next_turn();
        let _ = order.next_turn();

        order.remove_eliminated(|entity| entity != id(2));

        assert_eq!(order.participants(), &[id(0), id(1)]);
        assert_eq!(order.current_index(), 0);
        assert_eq!(order.round(), 1);
    }

    #[test]
    fn eliminating_everyone_leaves_no_actor() {
        let mut order = TurnOrder::new();
        order.set_participants([(id(0), 1), (id(1), 1)]);
        order.remove_eliminated(|_| false);

        assert!(order.is_empty());
        assert_eq!(order.current(), None);
    }
}
