//! Tunable combat parameters and compile-time capacity constants.

use std::time::Duration;

/// Combat balance parameters shared by the scheduler, resolver, and executor.
///
/// Content packages typically build this from a data file (see the
/// `combat-content` tables loader); the defaults here match the stock
/// balance set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Duration of the shared global cooldown advanced by every action that
    /// rides it.
    pub global_cooldown: Duration,

    /// Cooldown applied to definitions that do not declare one.
    pub default_cooldown: Duration,

    /// Fraction of the attack roll ceiling that lands as a critical hit.
    pub crit_chance: f64,

    /// Sides of the bounded die added to each side of a saving throw contest.
    pub save_die: u32,

    /// Damage rolls vary uniformly within ± this percentage of the average.
    pub damage_variance_percent: u32,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum resource costs a single action may declare.
    pub const MAX_RESOURCE_COSTS: usize = 4;
    /// Maximum persistent effects tracked per actor.
    pub const MAX_ACTIVE_EFFECTS: usize = 16;

    // ===== registration defaults (applied by the spec builders) =====
    pub const DEFAULT_COOLDOWN_SECS: u64 = 180;
    pub const DEFAULT_BASE_POTENCY: u32 = 100;
    pub const DEFAULT_CAST_MESSAGE: &'static str = "You begin to cast...";
    /// Cooldown actions sort after plain commands when matching input.
    pub const DEFAULT_COOLDOWN_PRIORITY: i32 = 1_000;
    pub const DEFAULT_COMMAND_PRIORITY: i32 = 50;

    pub fn new() -> Self {
        Self {
            global_cooldown: Duration::from_secs(2),
            default_cooldown: Duration::from_secs(Self::DEFAULT_COOLDOWN_SECS),
            crit_chance: 0.05,
            save_die: 20,
            damage_variance_percent: 20,
        }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
