//! Tunable rule constants.

use serde::{Deserialize, Serialize};
use skirmish_world::DEFAULT_LOG_CAPACITY;

/// Rule constants a session is created with.
///
/// Every field has a default, so a partial configuration file only needs to
/// name the values it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Action points spent on a basic attack.
    pub attack_cost: u32,
    /// Sides of the die rolled for action points each turn.
    pub ap_die: u32,
    /// Number of narration lines the event log retains.
    pub log_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            attack_cost: 2,
            ap_die: 6,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}
