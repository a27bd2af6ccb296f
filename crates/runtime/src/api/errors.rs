//! Error types surfaced by the combat runtime.

use thiserror::Error;

use combat_core::{ActorId, LedgerError, RegistryError, ScheduleError};

/// Target resolution failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("there is no '{0}' here")]
    NoSuchTarget(String),
    /// The resolved target exists but fails the action's own admission
    /// predicate.
    #[error("'{0}' cannot be used on that target")]
    InvalidTarget(String),
    #[error("'{0}' requires a target")]
    TargetRequired(String),
}

/// Persistence failure.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Unified failure type returned by executor operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("'{action}' requires level {required}")]
    LevelTooLow { action: String, required: u32 },

    /// The action handler itself failed; see the logs for the cause.
    #[error("action '{0}' failed")]
    ActionFailed(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Resources(#[from] LedgerError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
