//! Pure combat action rules.
//!
//! This crate holds everything that can be computed without a clock, a
//! network, or a player: action definitions and their registry, the
//! per-actor cooldown/cast/combo state machine, resource ledgers, saving
//! throws and damage rolls, and persistent effects. Every operation that
//! depends on time takes a [`GameTime`] argument, and every roll goes
//! through the [`CombatRng`] trait, so the whole crate is deterministic
//! under test.
//!
//! The `runtime` crate wires these rules to tokio timers, live actors, and
//! message delivery; the `combat-content` crate registers the stock action
//! set on top of them.

pub mod action;
pub mod combat;
pub mod config;
pub mod cooldown;
pub mod effect;
pub mod execute;
pub mod resources;
pub mod rng;
pub mod stats;
pub mod time;

pub use action::{
    ActionCategory, ActionDefinition, ActionRegistry, CommandSpec, CommitPolicy, Cooldown,
    CooldownSpec, HandlerError, RegistryError, SimpleSpec, SpecError,
};
pub use combat::{AttackRoll, CombatResolution, RollOutcome};
pub use config::CombatConfig;
pub use cooldown::{ActorCooldownState, CastOutcome, CastRecord, CoolingEntry, ScheduleError};
pub use effect::{AppliedEffect, DotTick, EffectDuration, EffectKind, EffectParams, EffectSet};
pub use execute::{ActorParts, InvocationContext, Narration, TargetHandle, TargetView};
pub use resources::{
    CostBasis, LedgerError, ResourceCost, ResourceKind, ResourceMeter, ResourcePool,
};
pub use rng::{CombatRng, SplitMixRng};
pub use stats::{ActorId, ActorStats, SavingThrow};
pub use time::GameTime;
