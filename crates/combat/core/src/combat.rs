//! Hit, cast, and damage resolution.
//!
//! Two roll flavors exist: physical rolls contest the attacker's scaled
//! attack roll against the defender's armor class, and cast rolls contest a
//! magic attack value against one of the defender's named saving throws.
//! Both report a signed margin, and in both a tie favors the defender.

use crate::config::CombatConfig;
use crate::rng::CombatRng;
use crate::stats::{ActorStats, SavingThrow};

/// Classified outcome of a single roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollOutcome {
    Miss,
    Hit,
    Critical,
}

/// Result of a hit or cast roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRoll {
    pub outcome: RollOutcome,
    /// Attack value minus defense value; negative or zero on a miss.
    pub margin: i32,
}

impl AttackRoll {
    pub fn is_miss(&self) -> bool {
        self.outcome == RollOutcome::Miss
    }

    pub fn is_critical(&self) -> bool {
        self.outcome == RollOutcome::Critical
    }
}

/// Physical roll to hit: scaled bounded roll plus hit modifier against the
/// defender's armor class.
///
/// The raw roll is uniform over `[1, attack_roll]`; rolls landing in the top
/// `crit_chance` fraction of that range are critical. Potency scales the
/// final attack value (100 = neutral). A tie is a miss.
pub fn roll_to_hit(
    attacker: &ActorStats,
    defender: &ActorStats,
    potency: u32,
    rng: &mut dyn CombatRng,
    config: &CombatConfig,
) -> AttackRoll {
    let ceiling = f64::from(attacker.attack_roll());
    let raw = ceiling * rng.uniform() + 1.0;
    let critical = raw > ceiling * (1.0 - config.crit_chance);

    let attack = (raw + f64::from(attacker.hit_mod())) * f64::from(potency) / 100.0;
    let defense = f64::from(defender.armor_class());
    let margin = (attack - defense).round() as i32;

    let outcome = if attack > defense {
        if critical {
            RollOutcome::Critical
        } else {
            RollOutcome::Hit
        }
    } else {
        RollOutcome::Miss
    };
    AttackRoll { outcome, margin }
}

/// Cast roll against a named saving throw.
///
/// Each side adds a bounded die to its derived value: the attacker's
/// potency-scaled magic roll against the defender's saving throw in the
/// named category. A natural maximum on the attacker's die is a critical.
/// A tie is a miss.
pub fn roll_to_cast(
    attacker: &ActorStats,
    defender: &ActorStats,
    potency: u32,
    save: SavingThrow,
    rng: &mut dyn CombatRng,
    config: &CombatConfig,
) -> AttackRoll {
    let die = rng.roll_die(config.save_die);
    let attack = attacker.magic_roll(save) * potency / 100 + die;
    let defense = defender.saving_throw(save) + rng.roll_die(config.save_die);
    let margin = attack as i32 - defense as i32;

    let outcome = if attack > defense {
        if die == config.save_die {
            RollOutcome::Critical
        } else {
            RollOutcome::Hit
        }
    } else {
        RollOutcome::Miss
    };
    AttackRoll { outcome, margin }
}

/// Damage for a successful roll.
///
/// Varies uniformly around the attacker's average damage, adds the flat
/// damage modifier, scales by potency, and doubles on a critical.
pub fn roll_damage(
    attacker: &ActorStats,
    critical: bool,
    potency: u32,
    rng: &mut dyn CombatRng,
    config: &CombatConfig,
) -> u32 {
    let average = attacker.average_damage();
    let spread = average * config.damage_variance_percent / 100;
    let low = average.saturating_sub(spread);
    let rolled = rng.range(low, average + spread) + attacker.damage_mod();

    let mut damage = rolled * potency / 100;
    if critical {
        damage *= 2;
    }
    damage.max(1)
}

/// Transient record of one executed action; returned to the caller and
/// discarded, never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatResolution {
    /// Canonical name of the action that ran.
    pub action: String,
    /// Roll outcome, or `None` when the action never consulted the resolver.
    pub outcome: Option<RollOutcome>,
    /// Potency the action resolved with (combo and buff adjustments included).
    pub potency: u32,
    /// Whether combo potency was in effect.
    pub combo: bool,
    /// Total damage dealt to the target.
    pub damage: u32,
    /// Total healing/restoration applied (all resource kinds).
    pub healing: u32,
    /// Names of persistent effects newly applied or refreshed.
    pub effects_applied: Vec<String>,
}

impl CombatResolution {
    pub fn new(action: impl Into<String>, potency: u32, combo: bool) -> Self {
        Self {
            action: action.into(),
            potency,
            combo,
            ..Self::default()
        }
    }

    /// True unless the resolver was consulted and reported a miss.
    pub fn is_hit(&self) -> bool {
        !matches!(self.outcome, Some(RollOutcome::Miss))
    }
}
