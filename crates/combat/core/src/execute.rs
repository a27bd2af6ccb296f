//! Invocation context handed to action handlers.
//!
//! By the time a handler runs, admission has already passed: cooldowns
//! checked, costs reserved, the target resolved. The context exposes the
//! actor's and target's combat state through a narrow set of operations so
//! handlers stay declarative; rolls, damage application, and narration all
//! go through here and are recorded into the returned [`CombatResolution`].

use crate::action::{ActionDefinition, HandlerError};
use crate::combat::{AttackRoll, CombatResolution, roll_damage, roll_to_cast, roll_to_hit};
use crate::config::CombatConfig;
use crate::cooldown::CoolingEntry;
use crate::effect::{EffectParams, EffectSet};
use crate::resources::{ResourceKind, ResourcePool, apply_instant};
use crate::rng::CombatRng;
use crate::stats::{ActorId, ActorStats, SavingThrow};
use crate::time::GameTime;

/// Mutable slice of one actor's combat state.
///
/// The runtime destructures an actor session into this shape so the context
/// can borrow the pieces it mutates without holding the whole session.
pub struct ActorParts<'a> {
    pub id: ActorId,
    pub name: &'a str,
    pub stats: &'a ActorStats,
    pub pool: &'a mut ResourcePool,
    pub effects: &'a mut EffectSet,
}

/// The resolved target of an invocation.
pub enum TargetHandle<'a> {
    /// No target (self-directed or untargeted actions).
    None,
    /// The actor targets themself; target operations alias the actor's
    /// own state.
    Actor,
    /// A distinct second actor.
    Other(ActorParts<'a>),
}

/// Read-only view of a candidate target, for admission predicates.
pub struct TargetView<'a> {
    pub id: ActorId,
    pub name: &'a str,
    pub stats: &'a ActorStats,
    pub pool: &'a ResourcePool,
    pub effects: &'a EffectSet,
}

impl TargetView<'_> {
    /// Current health as a percentage of maximum (0..=100).
    pub fn health_percent(&self) -> u32 {
        let meter = self.pool.health;
        if meter.maximum == 0 {
            return 0;
        }
        meter.current * 100 / meter.maximum
    }
}

/// A narration line produced during resolution, tagged with its recipient.
/// Delivery order is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Narration {
    ToActor(String),
    ToTarget(String),
}

/// Execution state for one admitted invocation.
pub struct InvocationContext<'a> {
    actor: ActorParts<'a>,
    target: TargetHandle<'a>,
    action: &'a ActionDefinition,
    /// Effective potency: base or combo potency, scaled by active buffs.
    potency: u32,
    is_combo: bool,
    rng: &'a mut dyn CombatRng,
    config: &'a CombatConfig,
    now: GameTime,
    /// Named cooldowns still running for the actor, for status commands.
    cooling: Vec<CoolingEntry>,
    resolution: CombatResolution,
    messages: Vec<Narration>,
}

impl<'a> InvocationContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        actor: ActorParts<'a>,
        target: TargetHandle<'a>,
        action: &'a ActionDefinition,
        potency: u32,
        is_combo: bool,
        rng: &'a mut dyn CombatRng,
        config: &'a CombatConfig,
        now: GameTime,
        cooling: Vec<CoolingEntry>,
    ) -> Self {
        let resolution = CombatResolution::new(&action.name, potency, is_combo);
        Self {
            actor,
            target,
            action,
            potency,
            is_combo,
            rng,
            config,
            now,
            cooling,
            resolution,
            messages: Vec::new(),
        }
    }

    // =========================================================
    // Accessors
    // =========================================================

    pub fn actor_id(&self) -> ActorId {
        self.actor.id
    }

    pub fn actor_name(&self) -> &str {
        self.actor.name
    }

    pub fn actor_stats(&self) -> &ActorStats {
        self.actor.stats
    }

    pub fn actor_pool(&self) -> &ResourcePool {
        self.actor.pool
    }

    pub fn actor_effects(&self) -> &EffectSet {
        self.actor.effects
    }

    pub fn level(&self) -> u32 {
        self.actor.stats.level
    }

    pub fn potency(&self) -> u32 {
        self.potency
    }

    pub fn is_combo(&self) -> bool {
        self.is_combo
    }

    pub fn now(&self) -> GameTime {
        self.now
    }

    pub fn config(&self) -> &CombatConfig {
        self.config
    }

    pub fn has_target(&self) -> bool {
        !matches!(self.target, TargetHandle::None)
    }

    pub fn target_name(&self) -> Option<&str> {
        match &self.target {
            TargetHandle::None => None,
            TargetHandle::Actor => Some(self.actor.name),
            TargetHandle::Other(t) => Some(t.name),
        }
    }

    fn target_stats(&self) -> Option<ActorStats> {
        match &self.target {
            TargetHandle::None => None,
            TargetHandle::Actor => Some(*self.actor.stats),
            TargetHandle::Other(t) => Some(*t.stats),
        }
    }

    /// Named cooldowns still running for the actor.
    pub fn cooling(&self) -> &[CoolingEntry] {
        &self.cooling
    }

    // =========================================================
    // Narration
    // =========================================================

    /// Queue a line for the actor.
    pub fn send(&mut self, message: impl Into<String>) {
        self.messages.push(Narration::ToActor(message.into()));
    }

    /// Queue a line for the target. The core only tags the recipient;
    /// routing (including self-targeted invocations) is the runtime's job.
    pub fn send_target(&mut self, message: impl Into<String>) {
        self.messages.push(Narration::ToTarget(message.into()));
    }

    // =========================================================
    // Combat operations
    // =========================================================

    /// Roll this action against the target and, on a hit, roll and apply
    /// damage to the target's health. Narrates both sides.
    ///
    /// Uses the definition's saving throw contest when one is declared,
    /// otherwise the physical hit roll.
    pub fn execute_attack(&mut self) -> Result<AttackRoll, HandlerError> {
        let save = self.action.saving_throw;
        let roll = self.roll_against_target(save)?;
        let verb = self.action.display_name.clone();
        let target = self
            .target_name()
            .unwrap_or_default()
            .to_string();
        let actor = self.actor.name.to_string();

        if roll.is_miss() {
            self.send(format!("Your {verb} misses {target}."));
            self.send_target(format!("{actor}'s {verb} misses you."));
            return Ok(roll);
        }

        let damage = roll_damage(
            self.actor.stats,
            roll.is_critical(),
            self.potency,
            self.rng,
            self.config,
        );
        let applied = self.adjust_target(ResourceKind::Health, -i64::from(damage))?;
        let dealt = applied.unsigned_abs();

        if roll.is_critical() {
            self.send(format!(
                "Your {verb} CRITICALLY strikes {target} for {dealt} damage!"
            ));
            self.send_target(format!(
                "{actor}'s {verb} CRITICALLY strikes you for {dealt} damage!"
            ));
        } else {
            self.send(format!("Your {verb} strikes {target} for {dealt} damage."));
            self.send_target(format!(
                "{actor}'s {verb} strikes you for {dealt} damage."
            ));
        }
        Ok(roll)
    }

    /// Roll against the target without applying damage.
    ///
    /// `save` picks the contest: a named saving throw, or `None` for the
    /// physical hit roll. The outcome is recorded in the resolution.
    pub fn roll_against_target(
        &mut self,
        save: Option<SavingThrow>,
    ) -> Result<AttackRoll, HandlerError> {
        let defender = self.target_stats().ok_or_else(|| {
            HandlerError::failed(format!("'{}' requires a target", self.action.name))
        })?;
        let roll = match save {
            Some(save) => roll_to_cast(
                self.actor.stats,
                &defender,
                self.potency,
                save,
                self.rng,
                self.config,
            ),
            None => roll_to_hit(
                self.actor.stats,
                &defender,
                self.potency,
                self.rng,
                self.config,
            ),
        };
        self.resolution.outcome = Some(roll.outcome);
        Ok(roll)
    }

    /// Clamped adjustment of one of the target's resources. Negative
    /// amounts damage, positive amounts restore. Returns the delta that
    /// actually applied.
    pub fn adjust_target(
        &mut self,
        kind: ResourceKind,
        amount: i64,
    ) -> Result<i64, HandlerError> {
        let pool = match &mut self.target {
            TargetHandle::None => {
                return Err(HandlerError::failed(format!(
                    "'{}' requires a target",
                    self.action.name
                )));
            }
            TargetHandle::Actor => &mut *self.actor.pool,
            TargetHandle::Other(t) => &mut *t.pool,
        };
        let applied = apply_instant(pool, kind, amount);
        self.record_delta(applied);
        Ok(applied)
    }

    /// Clamped adjustment of one of the actor's own resources.
    pub fn adjust_self(&mut self, kind: ResourceKind, amount: i64) -> i64 {
        let applied = apply_instant(self.actor.pool, kind, amount);
        self.record_delta(applied);
        applied
    }

    /// Restore a percentage of the actor's own maximum in `kind`.
    pub fn restore_self_percent(&mut self, kind: ResourceKind, percent: u32) -> i64 {
        let maximum = self.actor.pool.meter(kind).maximum;
        self.adjust_self(kind, i64::from(maximum) * i64::from(percent) / 100)
    }

    fn record_delta(&mut self, applied: i64) {
        if applied < 0 {
            self.resolution.damage += applied.unsigned_abs() as u32;
        } else {
            self.resolution.healing += applied as u32;
        }
    }

    /// Apply a persistent effect to the actor.
    pub fn apply_effect_self(&mut self, params: EffectParams) -> Result<(), HandlerError> {
        let name = params.name.clone();
        self.actor.effects.apply(params, self.now)?;
        self.resolution.effects_applied.push(name);
        Ok(())
    }

    /// Apply a persistent effect to the target.
    pub fn apply_effect_target(&mut self, params: EffectParams) -> Result<(), HandlerError> {
        let effects = match &mut self.target {
            TargetHandle::None => {
                return Err(HandlerError::failed(format!(
                    "'{}' requires a target",
                    self.action.name
                )));
            }
            TargetHandle::Actor => &mut *self.actor.effects,
            TargetHandle::Other(t) => &mut *t.effects,
        };
        let name = params.name.clone();
        effects.apply(params, self.now)?;
        self.resolution.effects_applied.push(name);
        Ok(())
    }

    /// Consume the context, yielding the resolution record and the queued
    /// narration in delivery order.
    pub fn finish(self) -> (CombatResolution, Vec<Narration>) {
        (self.resolution, self.messages)
    }
}
