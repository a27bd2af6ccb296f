//! Actor identity and combat stat derivation.
//!
//! Actors carry a small sheet of core stats; everything the resolver needs
//! (attack rolls, armor class, saving throws) is derived on demand rather
//! than stored. Derivations scale a pair of core stats by level, following
//! the character-sheet model the stock content was balanced against.

use std::fmt;

use strum::{Display, EnumString};

/// Unique identifier for any actor tracked by the combat runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Defender-side saving throw categories.
///
/// Each category is keyed on a pair of core stats:
///
/// | Category | Stats              |
/// |----------|--------------------|
/// | Will     | strength, vitality |
/// | Reflex   | strength, speed    |
/// | Resolve  | strength, magic    |
/// | Vigor    | vitality, speed    |
/// | Prudence | vitality, magic    |
/// | Guile    | speed, magic       |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SavingThrow {
    Will,
    Reflex,
    Resolve,
    Vigor,
    Prudence,
    Guile,
}

/// Core character sheet used for all combat derivations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorStats {
    pub level: u32,
    pub strength: u32,
    pub vitality: u32,
    pub magic: u32,
    pub speed: u32,
}

impl ActorStats {
    /// Level exponent applied to saving throws.
    const SAVE_LEVEL_POWER: f64 = 1.105;

    /// Multiplier turning a caster's own save into their magic attack value.
    const MAGIC_ROLL_SCALAR: u32 = 4;

    pub fn new(level: u32, strength: u32, vitality: u32, magic: u32, speed: u32) -> Self {
        Self {
            level,
            strength,
            vitality,
            magic,
            speed,
        }
    }

    /// Ceiling of the physical attack roll.
    ///
    /// Formula: `(2 × strength + speed) × (20 + level) / 20`
    pub fn attack_roll(&self) -> u32 {
        (2 * self.strength + self.speed) * (20 + self.level) / 20
    }

    /// Flat bonus added after the physical roll.
    pub fn hit_mod(&self) -> u32 {
        self.speed / 4
    }

    /// Average damage dealt per swing before variance and potency scaling.
    ///
    /// Formula: `strength × (10 + level) / 8`
    pub fn average_damage(&self) -> u32 {
        (self.strength * (10 + self.level) / 8).max(1)
    }

    /// Flat bonus added to damage rolls.
    pub fn damage_mod(&self) -> u32 {
        self.strength / 5
    }

    /// Armor class a physical roll must exceed. Ties favor the defender.
    ///
    /// Formula: `vitality × (20 + level) / 25`
    pub fn armor_class(&self) -> u32 {
        self.vitality * (20 + self.level) / 25
    }

    /// Defender-side saving throw value for the named category.
    ///
    /// Formula: `(a + b) × level ^ 1.105 / 2` where `a` and `b` are the
    /// category's stat pair.
    pub fn saving_throw(&self, kind: SavingThrow) -> u32 {
        let (a, b) = match kind {
            SavingThrow::Will => (self.strength, self.vitality),
            SavingThrow::Reflex => (self.strength, self.speed),
            SavingThrow::Resolve => (self.strength, self.magic),
            SavingThrow::Vigor => (self.vitality, self.speed),
            SavingThrow::Prudence => (self.vitality, self.magic),
            SavingThrow::Guile => (self.speed, self.magic),
        };
        let level = f64::from(self.level.max(1)).powf(Self::SAVE_LEVEL_POWER);
        ((f64::from(a + b) * level) / 2.0) as u32
    }

    /// Attacker-side magic attack value rolled against a saving throw.
    ///
    /// A caster's offense in a category is proportional to their own save in
    /// that category; a higher save yields better casts.
    pub fn magic_roll(&self, kind: SavingThrow) -> u32 {
        Self::MAGIC_ROLL_SCALAR * self.saving_throw(kind)
    }
}

impl Default for ActorStats {
    fn default() -> Self {
        Self::new(1, 10, 10, 10, 10)
    }
}
