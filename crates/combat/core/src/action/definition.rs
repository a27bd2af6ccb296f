//! Action definitions and the builders that produce them.
//!
//! Every invokable combat verb is described by one [`ActionDefinition`]
//! built through either [`SimpleSpec`] (plain commands with no scheduling)
//! or [`CooldownSpec`] (the full cooldown/cast/combo surface). Builders
//! exist so content packages only state what differs from the registration
//! defaults; everything else is filled in at build time.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::config::CombatConfig;
use crate::effect::EffectError;
use crate::execute::{InvocationContext, TargetView};
use crate::resources::ResourceCost;
use crate::stats::SavingThrow;

// =============================================================
// Scheduling surface
// =============================================================

/// Cooldown a definition rides once it commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cooldown {
    /// Rides only the shared global cooldown.
    Global,
    /// Carries its own named cooldown of this length, independent of the
    /// global cooldown.
    Timed(Duration),
}

impl Cooldown {
    /// Concrete length of this cooldown under the given balance parameters.
    pub fn duration(&self, config: &CombatConfig) -> Duration {
        match self {
            Cooldown::Global => config.global_cooldown,
            Cooldown::Timed(d) => *d,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Cooldown::Global)
    }
}

/// When reserved resource costs and the cooldown commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Costs and cooldown stick whether or not the roll lands.
    #[default]
    Always,
    /// A miss refunds the costs and leaves the cooldown untouched.
    OnHitOnly,
}

/// Broad classification used for matching priority and scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionCategory {
    /// No cooldown, no cast, no costs; runs immediately.
    Simple,
    /// Full scheduling surface.
    Cooldown,
}

// =============================================================
// Handler seams
// =============================================================

/// Effect body of an action. Returns `Ok(true)` when the action did its
/// work and should commit, `Ok(false)` to decline without error (the
/// scheduler rolls back as if the invocation never happened).
pub type ActionHandler =
    Arc<dyn Fn(&mut InvocationContext<'_>) -> Result<bool, HandlerError> + Send + Sync>;

/// Extra per-action admission check evaluated against the resolved target
/// before any state changes.
pub type TargetPredicate = Arc<dyn Fn(&TargetView<'_>) -> bool + Send + Sync>;

/// Failure raised from inside an action handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),
    #[error(transparent)]
    Effect(#[from] EffectError),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

// =============================================================
// Definition
// =============================================================

/// Complete description of one invokable action.
///
/// Immutable once built; registries hand out `Arc<ActionDefinition>` so the
/// same definition can be mid-execution while a reloaded registry replaces
/// it for future lookups.
#[derive(Clone)]
pub struct ActionDefinition {
    /// Canonical name, also the registry key and cooldown key.
    pub name: String,
    /// Alternate names matched exactly before prefix matching runs.
    pub aliases: Vec<String>,
    /// Name used in narration; defaults to the canonical name.
    pub display_name: String,
    pub category: ActionCategory,
    /// Lower wins when a prefix matches several actions.
    pub priority: i32,
    /// Minimum actor level required to invoke.
    pub level_required: u32,
    /// Base potency (100 = neutral).
    pub potency: u32,
    /// Potency used instead of `potency` when the combo window is open.
    pub combo_potency: Option<u32>,
    /// Canonical names of actions whose completion opens this action's
    /// combo window.
    pub combos_with: Vec<String>,
    pub cooldown: Cooldown,
    /// Cast time; `None` resolves instantly.
    pub cast_time: Option<Duration>,
    /// First-person line sent to the actor when a cast begins.
    pub cast_message: String,
    /// Saving throw contested instead of the physical hit roll.
    pub saving_throw: Option<SavingThrow>,
    pub costs: ArrayVec<ResourceCost, { CombatConfig::MAX_RESOURCE_COSTS }>,
    pub commit_policy: CommitPolicy,
    pub requires_target: bool,
    pub target_predicate: Option<TargetPredicate>,
    pub handler: ActionHandler,
}

impl ActionDefinition {
    /// Length of the combo window this action opens for its successors:
    /// its own cooldown duration.
    pub fn combo_window(&self, config: &CombatConfig) -> Duration {
        self.cooldown.duration(config)
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.category, ActionCategory::Simple)
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("level_required", &self.level_required)
            .field("potency", &self.potency)
            .field("combo_potency", &self.combo_potency)
            .field("combos_with", &self.combos_with)
            .field("cooldown", &self.cooldown)
            .field("cast_time", &self.cast_time)
            .field("saving_throw", &self.saving_throw)
            .field("costs", &self.costs)
            .field("commit_policy", &self.commit_policy)
            .field("requires_target", &self.requires_target)
            .finish_non_exhaustive()
    }
}

// =============================================================
// Builders
// =============================================================

/// Definition rejected at build time.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("action name must not be empty")]
    EmptyName,
    #[error("action '{0}' declares no handler")]
    MissingHandler(String),
    #[error("action '{0}' declares combo potency but no predecessors")]
    ComboWithoutPredecessors(String),
    #[error("action '{0}' declares more than {1} resource costs")]
    TooManyCosts(String, usize),
}

/// Builder for plain commands: no cooldown, no cast, no costs.
#[derive(Clone)]
pub struct SimpleSpec {
    name: String,
    aliases: Vec<String>,
    priority: i32,
    handler: Option<ActionHandler>,
}

impl SimpleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            priority: CombatConfig::DEFAULT_COMMAND_PRIORITY,
            handler: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn run(
        mut self,
        handler: impl Fn(&mut InvocationContext<'_>) -> Result<bool, HandlerError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<ActionDefinition, SpecError> {
        CommandSpec::Simple(self).build()
    }
}

/// Builder for full cooldown actions.
#[derive(Clone)]
pub struct CooldownSpec {
    name: String,
    aliases: Vec<String>,
    display_name: Option<String>,
    priority: i32,
    level_required: u32,
    potency: u32,
    combo_potency: Option<u32>,
    combos_with: Vec<String>,
    cooldown: Cooldown,
    cast_time: Option<Duration>,
    cast_message: Option<String>,
    saving_throw: Option<SavingThrow>,
    costs: Vec<ResourceCost>,
    commit_policy: CommitPolicy,
    requires_target: bool,
    target_predicate: Option<TargetPredicate>,
    handler: Option<ActionHandler>,
}

impl CooldownSpec {
    /// New cooldown action with the registration defaults: a 180 second
    /// named cooldown, neutral potency, no cast, no costs, target required.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            display_name: None,
            priority: CombatConfig::DEFAULT_COOLDOWN_PRIORITY,
            level_required: 1,
            potency: CombatConfig::DEFAULT_BASE_POTENCY,
            combo_potency: None,
            combos_with: Vec::new(),
            cooldown: Cooldown::Timed(Duration::from_secs(CombatConfig::DEFAULT_COOLDOWN_SECS)),
            cast_time: None,
            cast_message: None,
            saving_throw: None,
            costs: Vec::new(),
            commit_policy: CommitPolicy::default(),
            requires_target: true,
            target_predicate: None,
            handler: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn level_required(mut self, level: u32) -> Self {
        self.level_required = level;
        self
    }

    pub fn potency(mut self, potency: u32) -> Self {
        self.potency = potency;
        self
    }

    /// Declare a combo step: invoking within the window opened by any of
    /// `predecessors` substitutes `potency` for the base potency.
    pub fn combo(mut self, potency: u32, predecessors: &[&str]) -> Self {
        self.combo_potency = Some(potency);
        self.combos_with = predecessors.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Ride only the shared global cooldown.
    pub fn global_cooldown(mut self) -> Self {
        self.cooldown = Cooldown::Global;
        self
    }

    pub fn cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = Cooldown::Timed(duration);
        self
    }

    pub fn cast_time(mut self, duration: Duration) -> Self {
        self.cast_time = Some(duration);
        self
    }

    pub fn cast_message(mut self, message: impl Into<String>) -> Self {
        self.cast_message = Some(message.into());
        self
    }

    /// Contest the named saving throw instead of the physical hit roll.
    pub fn saving_throw(mut self, save: SavingThrow) -> Self {
        self.saving_throw = Some(save);
        self
    }

    pub fn cost(mut self, cost: ResourceCost) -> Self {
        self.costs.push(cost);
        self
    }

    pub fn commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// Allow invocation without a target (self-directed actions).
    pub fn no_target(mut self) -> Self {
        self.requires_target = false;
        self
    }

    /// Extra admission check against the resolved target.
    pub fn target_when(
        mut self,
        predicate: impl Fn(&TargetView<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.target_predicate = Some(Arc::new(predicate));
        self
    }

    pub fn run(
        mut self,
        handler: impl Fn(&mut InvocationContext<'_>) -> Result<bool, HandlerError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<ActionDefinition, SpecError> {
        CommandSpec::Cooldown(self).build()
    }
}

/// Either builder, unified for bulk registration.
#[derive(Clone)]
pub enum CommandSpec {
    Simple(SimpleSpec),
    Cooldown(CooldownSpec),
}

impl CommandSpec {
    pub fn name(&self) -> &str {
        match self {
            CommandSpec::Simple(s) => &s.name,
            CommandSpec::Cooldown(s) => &s.name,
        }
    }

    /// Validate and assemble the final definition.
    pub fn build(self) -> Result<ActionDefinition, SpecError> {
        match self {
            CommandSpec::Simple(spec) => {
                if spec.name.is_empty() {
                    return Err(SpecError::EmptyName);
                }
                let handler = spec
                    .handler
                    .ok_or_else(|| SpecError::MissingHandler(spec.name.clone()))?;
                Ok(ActionDefinition {
                    display_name: spec.name.clone(),
                    name: spec.name,
                    aliases: spec.aliases,
                    category: ActionCategory::Simple,
                    priority: spec.priority,
                    level_required: 1,
                    potency: CombatConfig::DEFAULT_BASE_POTENCY,
                    combo_potency: None,
                    combos_with: Vec::new(),
                    cooldown: Cooldown::Global,
                    cast_time: None,
                    cast_message: CombatConfig::DEFAULT_CAST_MESSAGE.to_string(),
                    saving_throw: None,
                    costs: ArrayVec::new(),
                    commit_policy: CommitPolicy::Always,
                    requires_target: false,
                    target_predicate: None,
                    handler,
                })
            }
            CommandSpec::Cooldown(spec) => {
                if spec.name.is_empty() {
                    return Err(SpecError::EmptyName);
                }
                let handler = spec
                    .handler
                    .ok_or_else(|| SpecError::MissingHandler(spec.name.clone()))?;
                if spec.combo_potency.is_some() && spec.combos_with.is_empty() {
                    return Err(SpecError::ComboWithoutPredecessors(spec.name));
                }
                let mut costs = ArrayVec::new();
                for cost in spec.costs {
                    costs
                        .try_push(cost)
                        .map_err(|_| {
                            SpecError::TooManyCosts(
                                spec.name.clone(),
                                CombatConfig::MAX_RESOURCE_COSTS,
                            )
                        })?;
                }
                Ok(ActionDefinition {
                    display_name: spec.display_name.unwrap_or_else(|| spec.name.clone()),
                    name: spec.name,
                    aliases: spec.aliases,
                    category: ActionCategory::Cooldown,
                    priority: spec.priority,
                    level_required: spec.level_required,
                    potency: spec.potency,
                    combo_potency: spec.combo_potency,
                    combos_with: spec.combos_with,
                    cooldown: spec.cooldown,
                    cast_time: spec.cast_time,
                    cast_message: spec
                        .cast_message
                        .unwrap_or_else(|| CombatConfig::DEFAULT_CAST_MESSAGE.to_string()),
                    saving_throw: spec.saving_throw,
                    costs,
                    commit_policy: spec.commit_policy,
                    requires_target: spec.requires_target,
                    target_predicate: spec.target_predicate,
                    handler,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceKind;

    #[test]
    fn cooldown_spec_applies_registration_defaults() {
        let def = CooldownSpec::new("slash").run(|_| Ok(true)).build().unwrap();
        assert_eq!(def.priority, CombatConfig::DEFAULT_COOLDOWN_PRIORITY);
        assert_eq!(def.potency, 100);
        assert_eq!(
            def.cooldown,
            Cooldown::Timed(Duration::from_secs(180))
        );
        assert_eq!(def.cast_message, CombatConfig::DEFAULT_CAST_MESSAGE);
        assert!(def.requires_target);
        assert_eq!(def.commit_policy, CommitPolicy::Always);
    }

    #[test]
    fn simple_spec_has_lower_matching_priority() {
        let def = SimpleSpec::new("cooldowns")
            .alias("cd")
            .run(|_| Ok(true))
            .build()
            .unwrap();
        assert!(def.is_simple());
        assert_eq!(def.priority, CombatConfig::DEFAULT_COMMAND_PRIORITY);
        assert!(def.cooldown.is_global());
    }

    #[test]
    fn combo_without_predecessors_is_rejected() {
        let mut spec = CooldownSpec::new("riposte").run(|_| Ok(true));
        spec.combo_potency = Some(350);
        assert_eq!(
            spec.build().unwrap_err(),
            SpecError::ComboWithoutPredecessors("riposte".into())
        );
    }

    #[test]
    fn missing_handler_is_rejected() {
        let err = CooldownSpec::new("slash").build().unwrap_err();
        assert_eq!(err, SpecError::MissingHandler("slash".into()));
        assert_eq!(
            SimpleSpec::new("").run(|_| Ok(true)).build().unwrap_err(),
            SpecError::EmptyName
        );
    }

    #[test]
    fn cost_list_is_bounded() {
        let mut spec = CooldownSpec::new("greedy").run(|_| Ok(true));
        for _ in 0..=CombatConfig::MAX_RESOURCE_COSTS {
            spec = spec.cost(ResourceCost::fixed(ResourceKind::Stamina, 1));
        }
        assert!(matches!(
            spec.build().unwrap_err(),
            SpecError::TooManyCosts(_, _)
        ));
    }
}
