//! Persistent effects: buffs, debuffs, and damage-over-time.
//!
//! Each applied effect carries its own duration and stack state. Expiry is
//! driven by the owning actor's update cycle: the host calls
//! [`EffectSet::expire_due`] and [`EffectSet::due_dot_ticks`] with the
//! current time; the core only guarantees the bookkeeping.

use std::time::Duration;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::config::CombatConfig;
use crate::time::GameTime;

/// Remaining lifetime of an applied effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDuration {
    /// Never expires on its own; removed only explicitly.
    Indefinite,
    /// Expires once the owner's clock passes this instant.
    Until(GameTime),
}

/// Behavior of a persistent effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Beneficial; `potency_percent` scales the owner's action potency
    /// (100 = neutral, 200 = double).
    Buff { potency_percent: u32 },
    /// Detrimental marker with no periodic behavior.
    Debuff,
    /// Reapplies damage every `interval` until the duration runs out.
    DamageOverTime {
        per_tick: u32,
        interval: Duration,
        /// Optional narration delivered on each tick; `{damage}` is replaced
        /// with the applied amount.
        tick_message: Option<String>,
    },
}

/// Parameters for applying (or merging) a persistent effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectParams {
    pub name: String,
    pub kind: EffectKind,
    /// `None` means indefinite.
    pub duration: Option<Duration>,
    pub max_stacks: u8,
}

impl EffectParams {
    pub fn buff(name: impl Into<String>, duration: Option<Duration>) -> Self {
        Self {
            name: name.into(),
            kind: EffectKind::Buff {
                potency_percent: 100,
            },
            duration,
            max_stacks: 1,
        }
    }

    pub fn debuff(name: impl Into<String>, duration: Option<Duration>) -> Self {
        Self {
            name: name.into(),
            kind: EffectKind::Debuff,
            duration,
            max_stacks: 1,
        }
    }

    pub fn dot(
        name: impl Into<String>,
        per_tick: u32,
        duration: Duration,
        interval: Duration,
        tick_message: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EffectKind::DamageOverTime {
                per_tick,
                interval: interval.max(Duration::from_millis(1)),
                tick_message,
            },
            duration: Some(duration),
            max_stacks: 1,
        }
    }

    /// Scale the owner's action potency while this buff is active.
    pub fn with_potency_percent(mut self, percent: u32) -> Self {
        if let EffectKind::Buff { potency_percent } = &mut self.kind {
            *potency_percent = percent;
        }
        self
    }

    /// Allow the effect to stack up to `max` applications.
    pub fn stacking(mut self, max: u8) -> Self {
        self.max_stacks = max.max(1);
        self
    }
}

/// A persistent effect currently applied to an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedEffect {
    pub name: String,
    pub kind: EffectKind,
    pub duration: EffectDuration,
    pub stacks: u8,
    pub max_stacks: u8,
    /// Next pending tick for damage-over-time effects.
    pub next_tick_at: Option<GameTime>,
}

impl AppliedEffect {
    pub fn is_expired(&self, now: GameTime) -> bool {
        match self.duration {
            EffectDuration::Indefinite => false,
            EffectDuration::Until(at) => !at.is_after(now),
        }
    }

    /// Seconds left, or `None` for indefinite effects.
    pub fn remaining(&self, now: GameTime) -> Option<Duration> {
        match self.duration {
            EffectDuration::Indefinite => None,
            EffectDuration::Until(at) => Some(at.saturating_since(now)),
        }
    }
}

/// A pending damage-over-time application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DotTick {
    pub effect: String,
    pub amount: u32,
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("cannot track more than {0} effects on one actor")]
    Saturated(usize),
}

/// All persistent effects on a single actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSet {
    effects: ArrayVec<AppliedEffect, { CombatConfig::MAX_ACTIVE_EFFECTS }>,
}

impl EffectSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&AppliedEffect> {
        self.effects.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppliedEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Apply or merge an effect.
    ///
    /// Merging refreshes the remaining duration to the new value; stackable
    /// effects additionally increment their stack count up to the declared
    /// maximum. Two applications never produce two records of one effect.
    pub fn apply(&mut self, params: EffectParams, now: GameTime) -> Result<&AppliedEffect, EffectError> {
        let duration = match params.duration {
            Some(d) => EffectDuration::Until(now + d),
            None => EffectDuration::Indefinite,
        };
        let next_tick_at = match &params.kind {
            EffectKind::DamageOverTime { interval, .. } => Some(now + *interval),
            _ => None,
        };

        if let Some(idx) = self.effects.iter().position(|e| e.name == params.name) {
            let existing = &mut self.effects[idx];
            existing.stacks = existing.stacks.saturating_add(1).min(existing.max_stacks);
            existing.duration = duration;
            existing.kind = params.kind;
            if existing.next_tick_at.is_none() {
                existing.next_tick_at = next_tick_at;
            }
            return Ok(&self.effects[idx]);
        }

        let effect = AppliedEffect {
            name: params.name,
            kind: params.kind,
            duration,
            stacks: 1,
            max_stacks: params.max_stacks.max(1),
            next_tick_at,
        };
        self.effects
            .try_push(effect)
            .map_err(|_| EffectError::Saturated(CombatConfig::MAX_ACTIVE_EFFECTS))?;
        Ok(self.effects.last().expect("just pushed"))
    }

    /// Explicitly remove an effect. Returns the removed record, if any.
    pub fn remove(&mut self, name: &str) -> Option<AppliedEffect> {
        let idx = self.effects.iter().position(|e| e.name == name)?;
        Some(self.effects.remove(idx))
    }

    /// Drop every expired effect, returning the removed names.
    pub fn expire_due(&mut self, now: GameTime) -> Vec<String> {
        let mut removed = Vec::new();
        self.effects.retain(|e| {
            if e.is_expired(now) {
                removed.push(e.name.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Collect damage-over-time ticks that have come due, advancing each
    /// effect's tick cursor. Ticks stop once the effect's duration is
    /// exhausted; the caller applies each tick through `apply_instant`.
    pub fn due_dot_ticks(&mut self, now: GameTime) -> Vec<DotTick> {
        let mut ticks = Vec::new();
        for effect in self.effects.iter_mut() {
            let EffectKind::DamageOverTime {
                per_tick,
                interval,
                tick_message,
            } = &effect.kind
            else {
                continue;
            };
            let stacks = u32::from(effect.stacks);
            while let Some(at) = effect.next_tick_at {
                if at.is_after(now) || effect.is_expired(at) {
                    break;
                }
                ticks.push(DotTick {
                    effect: effect.name.clone(),
                    amount: per_tick * stacks,
                    message: tick_message.clone(),
                });
                effect.next_tick_at = Some(at + *interval);
            }
        }
        ticks
    }

    /// Product of every active buff's potency scaling, as a percentage.
    pub fn potency_percent(&self, now: GameTime) -> u32 {
        self.effects
            .iter()
            .filter(|e| !e.is_expired(now))
            .fold(100u32, |acc, e| match &e.kind {
                EffectKind::Buff { potency_percent } => acc * potency_percent / 100,
                _ => acc,
            })
    }
}
