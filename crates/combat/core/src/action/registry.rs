//! Action registry: the lookup table player input resolves against.
//!
//! The registry is an immutable value once populated. Runtimes that want
//! hot reload build a fresh registry and swap the shared handle; in-flight
//! invocations keep executing against the definition `Arc` they already
//! resolved.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::action::definition::ActionDefinition;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("action or alias '{0}' is already registered")]
    DuplicateAction(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// All registered actions, keyed by canonical name with an alias index.
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<ActionDefinition>>,
    aliases: HashMap<String, String>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActionDefinition>> {
        self.actions.values()
    }

    /// Register a definition. Both the canonical name and every alias must
    /// be globally unique; nothing is inserted on failure.
    pub fn register(&mut self, def: ActionDefinition) -> Result<(), RegistryError> {
        let taken = |key: &str| self.actions.contains_key(key) || self.aliases.contains_key(key);
        if taken(&def.name) {
            return Err(RegistryError::DuplicateAction(def.name.clone()));
        }
        for alias in &def.aliases {
            if taken(alias) {
                return Err(RegistryError::DuplicateAction(alias.clone()));
            }
        }

        for alias in &def.aliases {
            self.aliases.insert(alias.clone(), def.name.clone());
        }
        self.actions.insert(def.name.clone(), Arc::new(def));
        Ok(())
    }

    /// Exact lookup by canonical name or alias.
    pub fn lookup(&self, name: &str) -> Result<Arc<ActionDefinition>, RegistryError> {
        if let Some(def) = self.actions.get(name) {
            return Ok(Arc::clone(def));
        }
        if let Some(canonical) = self.aliases.get(name) {
            if let Some(def) = self.actions.get(canonical) {
                return Ok(Arc::clone(def));
            }
        }
        Err(RegistryError::UnknownAction(name.to_string()))
    }

    /// Resolve player input: exact name, then exact alias, then unique-ish
    /// prefix.
    ///
    /// Prefix candidates are ranked by ascending priority (plain commands
    /// sort before cooldown actions), breaking ties on the smaller
    /// canonical name so resolution stays deterministic. An exact match
    /// always wins over any prefix match.
    pub fn find(&self, input: &str) -> Result<Arc<ActionDefinition>, RegistryError> {
        if input.is_empty() {
            return Err(RegistryError::UnknownAction(String::new()));
        }
        if let Ok(def) = self.lookup(input) {
            return Ok(def);
        }

        let mut best: Option<&Arc<ActionDefinition>> = None;
        for def in self.actions.values() {
            if !def.name.starts_with(input) && !def.aliases.iter().any(|a| a.starts_with(input)) {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    (def.priority, def.name.as_str()) < (current.priority, current.name.as_str())
                }
            };
            if better {
                best = Some(def);
            }
        }
        best.cloned()
            .ok_or_else(|| RegistryError::UnknownAction(input.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{CooldownSpec, SimpleSpec};

    fn registry() -> ActionRegistry {
        let mut reg = ActionRegistry::new();
        reg.register(
            CooldownSpec::new("flurry").run(|_| Ok(true)).build().unwrap(),
        )
        .unwrap();
        reg.register(
            CooldownSpec::new("flamestrike")
                .run(|_| Ok(true))
                .build()
                .unwrap(),
        )
        .unwrap();
        reg.register(
            SimpleSpec::new("cooldowns")
                .alias("cd")
                .run(|_| Ok(true))
                .build()
                .unwrap(),
        )
        .unwrap();
        reg
    }

    #[test]
    fn exact_match_beats_prefix() {
        let mut reg = registry();
        reg.register(CooldownSpec::new("fl").run(|_| Ok(true)).build().unwrap())
            .unwrap();
        assert_eq!(reg.find("fl").unwrap().name, "fl");
    }

    #[test]
    fn prefix_resolves_by_priority_then_name() {
        let reg = registry();
        // Both cooldown actions share priority; the smaller name wins.
        assert_eq!(reg.find("fl").unwrap().name, "flamestrike");
        // "coo" prefixes only the simple command.
        assert_eq!(reg.find("coo").unwrap().name, "cooldowns");
    }

    #[test]
    fn simple_commands_match_before_cooldown_actions() {
        let mut reg = registry();
        reg.register(
            CooldownSpec::new("coup de grace")
                .run(|_| Ok(true))
                .build()
                .unwrap(),
        )
        .unwrap();
        // "c" prefixes the simple command, its alias, and the cooldown
        // action; the command's lower priority matches first.
        assert_eq!(reg.find("c").unwrap().name, "cooldowns");
        // Unambiguous cooldown prefixes still reach the action.
        assert_eq!(reg.find("coup").unwrap().name, "coup de grace");
    }

    #[test]
    fn aliases_resolve_exactly_and_by_prefix() {
        let reg = registry();
        assert_eq!(reg.find("cd").unwrap().name, "cooldowns");
        assert_eq!(reg.lookup("cd").unwrap().name, "cooldowns");
    }

    #[test]
    fn duplicate_names_and_aliases_are_rejected() {
        let mut reg = registry();
        let err = reg
            .register(CooldownSpec::new("flurry").run(|_| Ok(true)).build().unwrap())
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAction("flurry".into()));

        let err = reg
            .register(
                CooldownSpec::new("chilling dirge")
                    .alias("cd")
                    .run(|_| Ok(true))
                    .build()
                    .unwrap(),
            )
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAction("cd".into()));
        // The failed registration inserted nothing.
        assert!(reg.lookup("chilling dirge").is_err());
    }

    #[test]
    fn unknown_input_is_an_error() {
        let reg = registry();
        assert!(matches!(
            reg.find("zzz"),
            Err(RegistryError::UnknownAction(_))
        ));
        assert!(matches!(reg.find(""), Err(RegistryError::UnknownAction(_))));
    }
}
