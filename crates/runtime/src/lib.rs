//! Async orchestration for the combat action framework.
//!
//! This crate wires the pure rules in `combat-core` to tokio: per-actor
//! sessions behind their own locks, the cast-time suspension point, a
//! hot-swappable action registry, and the collaborator traits an embedding
//! server implements. Consumers build a [`CombatExecutor`] and feed it raw
//! player input through [`CombatExecutor::invoke`].
//!
//! Modules are organized by responsibility:
//! - [`executor`] hosts the invocation pipeline and builder
//! - [`api`] exposes the traits and error types downstream servers use
//! - [`session`] owns per-actor state and the actor directory
//! - [`registry`], [`clock`], and [`rng`] adapt core abstractions to live
//!   infrastructure

pub mod api;
pub mod clock;
pub mod executor;
pub mod registry;
pub mod rng;
pub mod session;

pub use api::{
    ActorStateRepository, InMemoryActorRepository, MessageSink, NullMessageSink, RepositoryError,
    Result, RuntimeError, StaticTargetResolver, TargetError, TargetResolver,
};
pub use clock::RuntimeClock;
pub use executor::{CombatExecutor, CombatExecutorBuilder};
pub use registry::SharedRegistry;
pub use rng::EntropyRng;
pub use session::{ActorRecord, ActorSession};
