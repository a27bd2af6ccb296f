//! The combat executor: admission, cast suspension, and resolution.
//!
//! [`CombatExecutor::invoke`] is the single entry point for player input.
//! The pipeline, in order: registry lookup, scheduler admission, target
//! resolution, resource reservation, the (optional) cast wait, then
//! resolution under the session locks and cooldown commit. Rejections
//! before the cast cost nothing; once resources are reserved there is no
//! refund path unless the definition opts into `OnHitOnly`.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use tracing::{debug, error, warn};

use combat_core::{
    ActionDefinition, ActionRegistry, ActorId, ActorParts, CastOutcome, CombatConfig,
    CombatResolution, CombatRng, CommitPolicy, CoolingEntry, GameTime, InvocationContext,
    Narration, ResourcePool, TargetHandle, TargetView,
    resources::{apply_instant, reserve},
};

use crate::api::{
    ActorStateRepository, MessageSink, NullMessageSink, Result, RuntimeError,
    StaticTargetResolver, TargetError, TargetResolver,
};
use crate::clock::RuntimeClock;
use crate::registry::SharedRegistry;
use crate::rng::EntropyRng;
use crate::session::{ActorCell, ActorDirectory, ActorRecord, ActorSession};

/// Builder for [`CombatExecutor`].
pub struct CombatExecutorBuilder {
    registry: ActionRegistry,
    config: CombatConfig,
    targets: Arc<dyn TargetResolver>,
    messages: Arc<dyn MessageSink>,
    repository: Option<Arc<dyn ActorStateRepository>>,
    rng: Box<dyn CombatRng>,
}

impl CombatExecutorBuilder {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            config: CombatConfig::default(),
            targets: Arc::new(StaticTargetResolver::new()),
            messages: Arc::new(NullMessageSink),
            repository: None,
            rng: Box::new(EntropyRng::new()),
        }
    }

    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn target_resolver(mut self, targets: Arc<dyn TargetResolver>) -> Self {
        self.targets = targets;
        self
    }

    pub fn message_sink(mut self, messages: Arc<dyn MessageSink>) -> Self {
        self.messages = messages;
        self
    }

    pub fn repository(mut self, repository: Arc<dyn ActorStateRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Replace the roll source; tests inject a seeded generator here.
    pub fn rng(mut self, rng: Box<dyn CombatRng>) -> Self {
        self.rng = rng;
        self
    }

    pub fn build(self) -> CombatExecutor {
        CombatExecutor {
            actors: ActorDirectory::new(),
            registry: SharedRegistry::new(self.registry),
            config: self.config,
            targets: self.targets,
            messages: self.messages,
            repository: self.repository,
            clock: RuntimeClock::new(),
            rng: Mutex::new(self.rng),
        }
    }
}

/// Orchestrates combat action invocations across all actors.
pub struct CombatExecutor {
    actors: ActorDirectory,
    registry: SharedRegistry,
    config: CombatConfig,
    targets: Arc<dyn TargetResolver>,
    messages: Arc<dyn MessageSink>,
    repository: Option<Arc<dyn ActorStateRepository>>,
    clock: RuntimeClock,
    /// Rolls are serialized; resolution is synchronous, so the lock is
    /// held only across non-async code.
    rng: Mutex<Box<dyn CombatRng>>,
}

impl CombatExecutor {
    pub fn builder(registry: ActionRegistry) -> CombatExecutorBuilder {
        CombatExecutorBuilder::new(registry)
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn now(&self) -> GameTime {
        self.clock.now()
    }

    // =========================================================
    // Actor management
    // =========================================================

    pub fn add_actor(&self, id: ActorId, session: ActorSession) {
        self.actors.insert(id, session);
    }

    pub fn remove_actor(&self, id: ActorId) -> bool {
        self.actors.remove(id)
    }

    /// Run a closure against an actor's session, for inspection.
    pub async fn inspect<R>(
        &self,
        id: ActorId,
        f: impl FnOnce(&ActorSession) -> R,
    ) -> Result<R> {
        let cell = self.cell(id)?;
        let session = cell.session.lock().await;
        Ok(f(&session))
    }

    /// Persist an actor's current state, if a repository is configured.
    pub async fn save_actor(&self, id: ActorId) -> Result<()> {
        let Some(repository) = &self.repository else {
            return Ok(());
        };
        let cell = self.cell(id)?;
        let record = {
            let session = cell.session.lock().await;
            ActorRecord::from(&*session)
        };
        repository.save(id, &record).await?;
        Ok(())
    }

    /// Restore an actor from the repository. Returns `false` when no
    /// record exists (the actor is left untouched).
    pub async fn restore_actor(&self, id: ActorId) -> Result<bool> {
        let Some(repository) = &self.repository else {
            return Ok(false);
        };
        match repository.load(id).await? {
            Some(record) => {
                self.actors.insert(id, record.into());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // =========================================================
    // Registry management
    // =========================================================

    /// Atomically swap in a rebuilt registry. In-flight invocations finish
    /// against the snapshot they resolved from.
    pub fn reload(&self, registry: ActionRegistry) {
        let old = self.registry.replace(registry);
        debug!(previous_actions = old.len(), "action registry reloaded");
    }

    // =========================================================
    // Interrupts
    // =========================================================

    /// Cancel the actor's in-flight cast, if any. Safe to call at any
    /// time; interrupting an actor who is not casting does nothing.
    /// Returns whether a cast was actually cancelled.
    pub async fn interrupt(&self, id: ActorId) -> Result<bool> {
        let cell = self.cell(id)?;
        let cancelled = {
            let mut session = cell.session.lock().await;
            session.cooldowns.interrupt_cast().is_some()
        };
        // Wake the suspended invocation (if it is still waiting). The
        // cleared cast record, not this wakeup, is what cancels it.
        cell.interrupt.notify_waiters();
        if cancelled {
            debug!(actor = %id, "cast interrupted");
            self.messages
                .send_to(id, "Your concentration is broken!")
                .await;
        }
        Ok(cancelled)
    }

    // =========================================================
    // Invocation
    // =========================================================

    /// Invoke an action for `actor` from raw player input.
    ///
    /// Returns `Ok(Some(resolution))` when the action resolved,
    /// `Ok(None)` when an interrupt cancelled it mid-cast (normal
    /// cancellation, not an error), and `Err` for every rejection.
    pub async fn invoke(
        &self,
        actor_id: ActorId,
        input: &str,
        raw_target: Option<&str>,
    ) -> Result<Option<CombatResolution>> {
        let registry = self.registry.snapshot();
        let def = match registry.find(input) {
            Ok(def) => def,
            Err(err) => {
                self.messages.send_to(actor_id, "Huh?").await;
                return Err(err.into());
            }
        };
        let cell = self.cell(actor_id)?;

        // Plain commands skip the scheduler entirely: no cooldown, no
        // cast, no costs.
        if def.is_simple() {
            return self.run_simple(&cell, actor_id, &def).await;
        }

        // The resolver is caller-provided and may take locks of its own,
        // so it runs before the session lock is taken. Its outcome is
        // checked only after the scheduler gates, keeping rejection order
        // stable.
        let resolved = match (def.requires_target, raw_target) {
            (true, Some(raw)) if !raw.is_empty() => {
                Some(self.targets.resolve(actor_id, raw).await)
            }
            (true, _) => Some(Err(TargetError::TargetRequired(def.name.clone()))),
            (false, _) => None,
        };

        // Admission: everything up to the cast runs under the actor lock
        // and costs nothing until resources are reserved.
        let (outcome, cast_id, target_id) = {
            let mut session = cell.session.lock().await;
            let now = self.clock.now();

            if session.stats.level < def.level_required {
                drop(session);
                self.messages
                    .send_to(actor_id, &format!("You are not ready to use '{}'.", def.name))
                    .await;
                return Err(RuntimeError::LevelTooLow {
                    action: def.name.clone(),
                    required: def.level_required,
                });
            }

            if let Err(err) = session.cooldowns.can_start(&def, now) {
                drop(session);
                self.messages.send_to(actor_id, &err.to_string()).await;
                return Err(err.into());
            }

            let target_id = match resolved {
                Some(Ok(id)) => Some(id),
                Some(Err(err)) => {
                    drop(session);
                    self.messages.send_to(actor_id, &err.to_string()).await;
                    return Err(err.into());
                }
                None => None,
            };

            if let Err(err) = reserve(&mut session.pools, &def.costs) {
                drop(session);
                self.messages.send_to(actor_id, &err.to_string()).await;
                return Err(err.into());
            }

            let cast_id = cell.cast_seq.fetch_add(1, Ordering::Relaxed) + 1;
            // Admission was just checked; begin_cast cannot fail here.
            let outcome = session
                .cooldowns
                .begin_cast(&def, target_id, now, cast_id)?;
            (outcome, cast_id, target_id)
        };

        // Cast suspension. The actor lock is released; the recorded cast
        // is what keeps the scheduler closed for this actor.
        if let CastOutcome::CompletesAt(completes_at) = outcome {
            self.messages.send_to(actor_id, &def.cast_message).await;
            let sleep = tokio::time::sleep_until(self.clock.instant_at(completes_at));
            tokio::select! {
                _ = sleep => {}
                _ = cell.interrupt.notified() => {
                    let mut session = cell.session.lock().await;
                    session.cooldowns.interrupt_cast();
                    debug!(actor = %actor_id, action = %def.name, "cast cancelled");
                    return Ok(None);
                }
            }
        }

        self.resolve(&cell, actor_id, &def, &registry, target_id, cast_id)
            .await
    }

    /// Run a plain command: handler only, nothing scheduled or spent.
    async fn run_simple(
        &self,
        cell: &Arc<ActorCell>,
        actor_id: ActorId,
        def: &Arc<ActionDefinition>,
    ) -> Result<Option<CombatResolution>> {
        let (handler_result, resolution, narration) = {
            let mut session = cell.session.lock().await;
            let now = self.clock.now();
            let cooling: Vec<CoolingEntry> = session.cooldowns.iter_cooling(now).collect();

            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let ActorSession {
                name,
                stats,
                pools,
                cooldowns: _,
                effects,
            } = &mut *session;
            let mut ctx = InvocationContext::new(
                ActorParts {
                    id: actor_id,
                    name: name.as_str(),
                    stats,
                    pool: pools,
                    effects,
                },
                TargetHandle::None,
                def,
                def.potency,
                false,
                &mut **rng,
                &self.config,
                now,
                cooling,
            );
            let handler_result = (def.handler)(&mut ctx);
            let (resolution, narration) = ctx.finish();
            (handler_result, resolution, narration)
        };

        match handler_result {
            Ok(true) => {
                self.deliver(actor_id, None, narration).await;
                Ok(Some(resolution))
            }
            Ok(false) => {
                self.deliver(actor_id, None, narration).await;
                Ok(None)
            }
            Err(err) => {
                error!(actor = %actor_id, action = %def.name, error = %err, "command handler failed");
                self.messages
                    .send_to(actor_id, "Something goes horribly wrong. Nothing happens.")
                    .await;
                Err(RuntimeError::ActionFailed(def.name.clone()))
            }
        }
    }

    /// Resolution: claim the cast, run the handler, commit, narrate.
    async fn resolve(
        &self,
        cell: &Arc<ActorCell>,
        actor_id: ActorId,
        def: &Arc<ActionDefinition>,
        registry: &Arc<ActionRegistry>,
        target_id: Option<ActorId>,
        cast_id: u64,
    ) -> Result<Option<CombatResolution>> {
        // Lock the sessions involved, in ascending id order when two are.
        let other = match target_id {
            Some(tid) if tid != actor_id => match self.actors.get(tid) {
                Some(target_cell) => Some((tid, target_cell)),
                None => {
                    // Target vanished during the cast. The cast is spent.
                    let mut session = cell.session.lock().await;
                    session.cooldowns.interrupt_cast();
                    drop(session);
                    let err = TargetError::NoSuchTarget(String::new());
                    self.messages
                        .send_to(actor_id, "Your target is no longer here.")
                        .await;
                    return Err(err.into());
                }
            },
            _ => None,
        };

        let (mut actor_session, mut target_session) = match &other {
            None => (cell.session.lock().await, None),
            Some((tid, target_cell)) => {
                if actor_id < *tid {
                    let a = cell.session.lock().await;
                    let t = target_cell.session.lock().await;
                    (a, Some(t))
                } else {
                    let t = target_cell.session.lock().await;
                    let a = cell.session.lock().await;
                    (a, Some(t))
                }
            }
        };

        let now = self.clock.now();
        // An interrupt that landed after the timer elapsed still wins:
        // without the matching cast record, resolution does not happen.
        if actor_session.cooldowns.finish_cast(cast_id).is_none() {
            debug!(actor = %actor_id, action = %def.name, "cast superseded before resolution");
            return Ok(None);
        }

        // Effects advance before resolution so the roll sees current state.
        let mut outbox: Vec<(ActorId, String)> = Vec::new();
        for line in actor_session.tick_effects(now) {
            outbox.push((actor_id, line));
        }
        if let (Some(target), Some((tid, _))) = (target_session.as_mut(), &other) {
            for line in target.tick_effects(now) {
                outbox.push((*tid, line));
            }
        }

        // Combo check, then buff scaling.
        let mut is_combo = false;
        let mut potency = def.potency;
        if let Some(combo_potency) = def.combo_potency {
            let window = actor_session
                .cooldowns
                .last_completed()
                .and_then(|(last, _)| registry.lookup(last).ok())
                .map(|prev| prev.combo_window(&self.config))
                .unwrap_or(self.config.global_cooldown);
            if actor_session.cooldowns.combo_eligible(def, window, now) {
                is_combo = true;
                potency = combo_potency;
            }
        }
        potency = potency * actor_session.effects.potency_percent(now) / 100;

        // Target predicate runs against post-tick state.
        if let Some(predicate) = &def.target_predicate {
            let view = match (&target_session, &other) {
                (Some(target), Some((tid, _))) => TargetView {
                    id: *tid,
                    name: &target.name,
                    stats: &target.stats,
                    pool: &target.pools,
                    effects: &target.effects,
                },
                _ => TargetView {
                    id: actor_id,
                    name: &actor_session.name,
                    stats: &actor_session.stats,
                    pool: &actor_session.pools,
                    effects: &actor_session.effects,
                },
            };
            if !predicate(&view) {
                drop(target_session);
                drop(actor_session);
                let err = TargetError::InvalidTarget(def.name.clone());
                self.flush(outbox).await;
                self.messages.send_to(actor_id, &err.to_string()).await;
                return Err(err.into());
            }
        }

        // Snapshot the cooling list before the session is split-borrowed;
        // status commands read it through the context.
        let cooling: Vec<CoolingEntry> = actor_session.cooldowns.iter_cooling(now).collect();

        // Run the handler with the rng lock held across the synchronous
        // resolution only.
        let handler_result;
        let resolution;
        let narration;
        {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };

            let ActorSession {
                name,
                stats,
                pools,
                cooldowns: _,
                effects,
            } = &mut *actor_session;
            let actor_parts = ActorParts {
                id: actor_id,
                name: name.as_str(),
                stats,
                pool: pools,
                effects,
            };
            let target_handle = match (target_session.as_mut(), &other) {
                (Some(target), Some((tid, _))) => {
                    let ActorSession {
                        name,
                        stats,
                        pools,
                        cooldowns: _,
                        effects,
                    } = &mut **target;
                    TargetHandle::Other(ActorParts {
                        id: *tid,
                        name: name.as_str(),
                        stats,
                        pool: pools,
                        effects,
                    })
                }
                _ if target_id == Some(actor_id) => TargetHandle::Actor,
                _ => TargetHandle::None,
            };

            let mut ctx = InvocationContext::new(
                actor_parts,
                target_handle,
                def,
                potency,
                is_combo,
                &mut **rng,
                &self.config,
                now,
                cooling,
            );
            handler_result = (def.handler)(&mut ctx);
            let (res, msgs) = ctx.finish();
            resolution = res;
            narration = msgs;
        }

        match handler_result {
            Ok(true) => {}
            Ok(false) => {
                // The handler declined: roll the reservation back and
                // commit nothing. Narration still flows (the handler
                // said why).
                refund(&mut actor_session.pools, def);
                drop(target_session);
                drop(actor_session);
                self.flush(outbox).await;
                self.deliver(actor_id, target_id, narration).await;
                return Ok(None);
            }
            Err(err) => {
                error!(actor = %actor_id, action = %def.name, error = %err, "action handler failed");
                drop(target_session);
                drop(actor_session);
                self.flush(outbox).await;
                self.messages
                    .send_to(actor_id, "Something goes horribly wrong. Nothing happens.")
                    .await;
                return Err(RuntimeError::ActionFailed(def.name.clone()));
            }
        }

        // Commit, honoring the miss policy.
        let missed = !resolution.is_hit();
        if missed && def.commit_policy == CommitPolicy::OnHitOnly {
            refund(&mut actor_session.pools, def);
        } else {
            actor_session.cooldowns.commit(def, now, &self.config);
        }

        drop(target_session);
        drop(actor_session);

        self.flush(outbox).await;
        self.deliver(actor_id, target_id, narration).await;

        if let Err(err) = self.save_actor(actor_id).await {
            warn!(actor = %actor_id, error = %err, "failed to persist actor after action");
        }

        debug!(
            actor = %actor_id,
            action = %def.name,
            potency,
            combo = is_combo,
            damage = resolution.damage,
            "action resolved"
        );
        Ok(Some(resolution))
    }

    /// List the actor's named cooldowns still running, newest-ready first.
    pub async fn cooling(&self, id: ActorId) -> Result<Vec<(String, GameTime)>> {
        let cell = self.cell(id)?;
        let session = cell.session.lock().await;
        let now = self.clock.now();
        Ok(session
            .cooldowns
            .iter_cooling(now)
            .map(|entry| (entry.action, entry.ready_at))
            .collect())
    }

    fn cell(&self, id: ActorId) -> Result<Arc<ActorCell>> {
        self.actors.get(id).ok_or(RuntimeError::UnknownActor(id))
    }

    async fn flush(&self, outbox: Vec<(ActorId, String)>) {
        for (recipient, line) in outbox {
            self.messages.send_to(recipient, &line).await;
        }
    }

    /// Route tagged narration to its recipients.
    async fn deliver(
        &self,
        actor_id: ActorId,
        target_id: Option<ActorId>,
        narration: Vec<Narration>,
    ) {
        for line in narration {
            match line {
                Narration::ToActor(text) => self.messages.send_to(actor_id, &text).await,
                Narration::ToTarget(text) => match target_id {
                    Some(tid) if tid != actor_id => self.messages.send_to(tid, &text).await,
                    Some(_) => self.messages.send_to(actor_id, &text).await,
                    None => {}
                },
            }
        }
    }
}

/// Re-credit a definition's reserved costs (miss under `OnHitOnly`, or a
/// declined handler).
fn refund(pools: &mut ResourcePool, def: &ActionDefinition) {
    for cost in &def.costs {
        let amount = cost.cost_for(pools);
        apply_instant(pools, cost.kind, i64::from(amount));
    }
}
