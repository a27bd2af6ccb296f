//! Per-actor cooldown, cast, and combo bookkeeping.
//!
//! One [`ActorCooldownState`] lives inside each actor's session and is the
//! single authority on whether that actor may start an action right now.
//! The state machine is pure: every transition takes the current
//! [`GameTime`] from the caller, so the runtime decides how timers elapse
//! and tests can step them directly.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::action::{ActionDefinition, Cooldown};
use crate::config::CombatConfig;
use crate::stats::ActorId;
use crate::time::GameTime;

/// Admission failure reported before any state changes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("'{action}' is not ready for another {}.{:03}s", remaining.as_secs(), remaining.subsec_millis())]
    OnCooldown {
        action: String,
        remaining: Duration,
    },
    #[error("already casting '{action}'")]
    AlreadyCasting { action: String },
}

/// An in-flight cast.
///
/// Present from the moment an invocation is admitted until it resolves or
/// is interrupted; instant actions carry one for the (zero-length) span of
/// their resolution so an interrupt arriving mid-resolution has something
/// to cancel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastRecord {
    pub action: String,
    pub started_at: GameTime,
    pub completes_at: GameTime,
    pub target: Option<ActorId>,
    /// Monotonic per-actor sequence number; resolution only proceeds when
    /// the record with the same id is still present.
    pub cast_id: u64,
}

/// Outcome of admitting an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastOutcome {
    /// No cast time; resolve immediately.
    ReadyNow,
    /// Cast begun; resolve once this instant passes (unless interrupted).
    CompletesAt(GameTime),
}

/// The name and readiness instant of one cooling action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoolingEntry {
    pub action: String,
    pub ready_at: GameTime,
}

/// Scheduler state for a single actor.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorCooldownState {
    /// Named cooldowns currently running, by canonical action name.
    ready_at: HashMap<String, GameTime>,
    /// Shared global cooldown; consumed and advanced only by actions
    /// flagged for it.
    global_ready_at: Option<GameTime>,
    /// Most recent successful completion, for combo windows.
    last_completed: Option<(String, GameTime)>,
    /// In-flight cast, if any. Never persisted; a restored actor is not
    /// mid-cast.
    #[cfg_attr(feature = "serde", serde(skip))]
    casting: Option<CastRecord>,
}

impl ActorCooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================
    // Queries
    // =========================================================

    /// Remaining wait before `def` may start, or `None` if it is ready.
    ///
    /// Global-flagged actions wait on the shared global cooldown; timed
    /// actions wait only on their own named timer. The two pools never
    /// gate each other.
    pub fn remaining(&self, def: &ActionDefinition, now: GameTime) -> Option<Duration> {
        let wait = match def.cooldown {
            Cooldown::Global => self
                .global_ready_at
                .map(|at| at.saturating_since(now))
                .unwrap_or(Duration::ZERO),
            Cooldown::Timed(_) => self
                .ready_at
                .get(&def.name)
                .map(|at| at.saturating_since(now))
                .unwrap_or(Duration::ZERO),
        };
        (wait > Duration::ZERO).then_some(wait)
    }

    /// Check admission without changing anything.
    ///
    /// An action is admissible when the actor is not mid-cast and its own
    /// cooldown has elapsed: the shared global cooldown for global-flagged
    /// actions, the named per-action timer otherwise. The instant
    /// `ready_at` itself counts as ready.
    pub fn can_start(&self, def: &ActionDefinition, now: GameTime) -> Result<(), ScheduleError> {
        if let Some(cast) = &self.casting {
            return Err(ScheduleError::AlreadyCasting {
                action: cast.action.clone(),
            });
        }
        if let Some(remaining) = self.remaining(def, now) {
            return Err(ScheduleError::OnCooldown {
                action: def.name.clone(),
                remaining,
            });
        }
        Ok(())
    }

    /// The in-flight cast, if any.
    pub fn casting(&self) -> Option<&CastRecord> {
        self.casting.as_ref()
    }

    /// The most recent committed completion, if any.
    pub fn last_completed(&self) -> Option<(&str, GameTime)> {
        self.last_completed
            .as_ref()
            .map(|(name, at)| (name.as_str(), *at))
    }

    /// Whether `def`'s combo window is open: the actor's most recent
    /// completion is one of `def`'s predecessors and happened within that
    /// predecessor's window.
    pub fn combo_eligible(
        &self,
        def: &ActionDefinition,
        window: Duration,
        now: GameTime,
    ) -> bool {
        if def.combo_potency.is_none() {
            return false;
        }
        let Some((last, at)) = &self.last_completed else {
            return false;
        };
        def.combos_with.iter().any(|p| p == last) && now.saturating_since(*at) <= window
    }

    /// Named cooldowns still running at `now`, for status displays.
    pub fn iter_cooling(&self, now: GameTime) -> impl Iterator<Item = CoolingEntry> + '_ {
        let mut entries: Vec<CoolingEntry> = self
            .ready_at
            .iter()
            .filter(|(_, at)| at.is_after(now))
            .map(|(action, at)| CoolingEntry {
                action: action.clone(),
                ready_at: *at,
            })
            .collect();
        entries.sort_by(|a, b| a.ready_at.cmp(&b.ready_at).then(a.action.cmp(&b.action)));
        entries.into_iter()
    }

    // =========================================================
    // Transitions
    // =========================================================

    /// Admit an invocation and record its cast.
    ///
    /// Always records a [`CastRecord`], even for instant actions, so that
    /// an interrupt racing the resolution has a record to clear. The caller
    /// must pair this with [`Self::finish_cast`] (on resolution) or
    /// [`Self::interrupt_cast`].
    pub fn begin_cast(
        &mut self,
        def: &ActionDefinition,
        target: Option<ActorId>,
        now: GameTime,
        cast_id: u64,
    ) -> Result<CastOutcome, ScheduleError> {
        self.can_start(def, now)?;
        let completes_at = now + def.cast_time.unwrap_or(Duration::ZERO);
        self.casting = Some(CastRecord {
            action: def.name.clone(),
            started_at: now,
            completes_at,
            target,
            cast_id,
        });
        Ok(match def.cast_time {
            None => CastOutcome::ReadyNow,
            Some(_) => CastOutcome::CompletesAt(completes_at),
        })
    }

    /// Claim the in-flight cast for resolution.
    ///
    /// Returns `None` when no cast with this id is pending, which means an
    /// interrupt (or a competing resolution) won the race; the caller must
    /// then drop the invocation without resolving it.
    pub fn finish_cast(&mut self, cast_id: u64) -> Option<CastRecord> {
        if self.casting.as_ref()?.cast_id != cast_id {
            return None;
        }
        self.casting.take()
    }

    /// Cancel the in-flight cast, if any. Idempotent; interrupting an
    /// actor who is not casting does nothing.
    pub fn interrupt_cast(&mut self) -> Option<CastRecord> {
        self.casting.take()
    }

    /// Commit `def`'s cooldown after a resolution that sticks.
    ///
    /// Global-flagged definitions advance the shared global cooldown;
    /// timed definitions start their own named timer and leave the global
    /// window untouched. Either way the completion is recorded for combo
    /// chaining.
    pub fn commit(&mut self, def: &ActionDefinition, now: GameTime, config: &CombatConfig) {
        match def.cooldown {
            Cooldown::Global => {
                let until = now + config.global_cooldown;
                self.global_ready_at = Some(match self.global_ready_at {
                    Some(existing) if existing.is_after(until) => existing,
                    _ => until,
                });
            }
            Cooldown::Timed(duration) => {
                self.ready_at.insert(def.name.clone(), now + duration);
            }
        }
        self.last_completed = Some((def.name.clone(), now));
    }

    /// Drop named cooldowns that have fully elapsed. Callers may run this
    /// opportunistically; readiness checks never require it.
    pub fn prune(&mut self, now: GameTime) {
        self.ready_at.retain(|_, at| at.is_after(now));
    }
}
