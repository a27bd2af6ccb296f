//! Types downstream servers interact with.

pub mod errors;
pub mod providers;

pub use errors::{RepositoryError, Result, RuntimeError, TargetError};
pub use providers::{
    ActorStateRepository, InMemoryActorRepository, MessageSink, NullMessageSink,
    StaticTargetResolver, TargetResolver,
};
