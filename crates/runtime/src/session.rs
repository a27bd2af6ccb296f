//! Per-actor combat sessions and the directory that owns them.
//!
//! Each actor's combat state lives behind its own `tokio::sync::Mutex`, so
//! two actors resolve actions concurrently and one actor's operations
//! serialize. When an invocation needs both the actor and a distinct
//! target, the executor locks the two cells in ascending id order.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use combat_core::{
    ActorCooldownState, ActorId, ActorStats, EffectSet, GameTime, ResourceKind, ResourcePool,
    resources::apply_instant,
};

/// One actor's live combat state.
#[derive(Clone, Debug)]
pub struct ActorSession {
    pub name: String,
    pub stats: ActorStats,
    pub pools: ResourcePool,
    pub cooldowns: ActorCooldownState,
    pub effects: EffectSet,
}

impl ActorSession {
    pub fn new(name: impl Into<String>, stats: ActorStats, pools: ResourcePool) -> Self {
        Self {
            name: name.into(),
            stats,
            pools,
            cooldowns: ActorCooldownState::new(),
            effects: EffectSet::new(),
        }
    }

    /// Advance this actor's effects to `now`: apply due damage-over-time
    /// ticks to health and drop expired effects. Returns narration lines
    /// for the actor.
    pub fn tick_effects(&mut self, now: GameTime) -> Vec<String> {
        let mut lines = Vec::new();
        for tick in self.effects.due_dot_ticks(now) {
            let applied = apply_instant(
                &mut self.pools,
                ResourceKind::Health,
                -i64::from(tick.amount),
            );
            if let Some(message) = tick.message {
                lines.push(message.replace("{damage}", &applied.unsigned_abs().to_string()));
            }
        }
        for name in self.effects.expire_due(now) {
            lines.push(format!("The '{name}' effect wears off."));
        }
        lines
    }
}

/// Serializable snapshot of an [`ActorSession`].
///
/// The in-flight cast is deliberately absent: a restored actor is never
/// mid-cast.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorRecord {
    pub name: String,
    pub stats: ActorStats,
    pub pools: ResourcePool,
    pub cooldowns: ActorCooldownState,
    pub effects: EffectSet,
}

impl From<&ActorSession> for ActorRecord {
    fn from(session: &ActorSession) -> Self {
        Self {
            name: session.name.clone(),
            stats: session.stats,
            pools: session.pools,
            cooldowns: session.cooldowns.clone(),
            effects: session.effects.clone(),
        }
    }
}

impl From<ActorRecord> for ActorSession {
    fn from(record: ActorRecord) -> Self {
        Self {
            name: record.name,
            stats: record.stats,
            pools: record.pools,
            cooldowns: record.cooldowns,
            effects: record.effects,
        }
    }
}

/// Concurrency wrapper around one actor's session.
pub struct ActorCell {
    pub session: Mutex<ActorSession>,
    /// Wakes a cast currently suspended in the executor. Carries no
    /// payload; the cast record is the source of truth.
    pub interrupt: Notify,
    /// Issues cast ids for this actor.
    pub cast_seq: AtomicU64,
}

impl ActorCell {
    fn new(session: ActorSession) -> Self {
        Self {
            session: Mutex::new(session),
            interrupt: Notify::new(),
            cast_seq: AtomicU64::new(0),
        }
    }
}

/// All actors known to the executor.
#[derive(Default)]
pub struct ActorDirectory {
    cells: RwLock<HashMap<ActorId, Arc<ActorCell>>>,
}

impl ActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) an actor's session.
    pub fn insert(&self, id: ActorId, session: ActorSession) {
        let cell = Arc::new(ActorCell::new(session));
        match self.cells.write() {
            Ok(mut cells) => {
                cells.insert(id, cell);
            }
            Err(mut poisoned) => {
                poisoned.get_mut().insert(id, cell);
            }
        }
    }

    pub fn remove(&self, id: ActorId) -> bool {
        match self.cells.write() {
            Ok(mut cells) => cells.remove(&id).is_some(),
            Err(mut poisoned) => poisoned.get_mut().remove(&id).is_some(),
        }
    }

    pub fn get(&self, id: ActorId) -> Option<Arc<ActorCell>> {
        match self.cells.read() {
            Ok(cells) => cells.get(&id).cloned(),
            Err(poisoned) => poisoned.get_ref().get(&id).cloned(),
        }
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::EffectParams;
    use std::time::Duration;

    #[test]
    fn tick_effects_applies_dots_and_expiry() {
        let mut session = ActorSession::new(
            "Rat",
            ActorStats::default(),
            ResourcePool::full(100, 10, 10),
        );
        session
            .effects
            .apply(
                EffectParams::dot(
                    "shocked",
                    4,
                    Duration::from_secs(30),
                    Duration::from_secs(2),
                    Some("You convulse ({damage})!".into()),
                ),
                GameTime::ZERO,
            )
            .unwrap();

        let lines = session.tick_effects(GameTime::from_secs(6));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "You convulse (4)!");
        assert_eq!(session.pools.health.current, 88);

        let lines = session.tick_effects(GameTime::from_secs(40));
        assert!(lines.iter().any(|l| l.contains("wears off")));
        assert!(!session.effects.has("shocked"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let mut session = ActorSession::new(
            "Kael",
            ActorStats::new(12, 18, 14, 9, 11),
            ResourcePool::full(140, 60, 80),
        );
        session.pools.mana.current = 33;

        let record = ActorRecord::from(&session);
        let json = serde_json::to_string(&record).unwrap();
        let restored: ActorSession = serde_json::from_str::<ActorRecord>(&json).unwrap().into();
        assert_eq!(restored.name, "Kael");
        assert_eq!(restored.pools.mana.current, 33);
        assert_eq!(restored.stats, session.stats);
        // No cast survives persistence.
        assert!(restored.cooldowns.casting().is_none());
    }
}
