//! Action definitions and the registry they live in.

pub mod definition;
pub mod registry;

pub use definition::{
    ActionCategory, ActionDefinition, ActionHandler, CommandSpec, CommitPolicy, Cooldown,
    CooldownSpec, HandlerError, SimpleSpec, SpecError, TargetPredicate,
};
pub use registry::{ActionRegistry, RegistryError};
