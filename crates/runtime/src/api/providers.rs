//! Collaborator traits the embedding server plugs into the executor.
//!
//! The combat runtime knows nothing about rooms, sockets, or databases.
//! Target lookup, narration delivery, and actor persistence are all
//! injected through these traits, so the executor runs the same against a
//! MUD server, a test harness, or a bot driver.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use combat_core::ActorId;

use super::errors::{RepositoryError, TargetError};
use crate::session::ActorRecord;

/// Maps a player-supplied target string to an actor.
///
/// Implementations typically consult the actor's room. Returning
/// [`TargetError::NoSuchTarget`] rejects the invocation before any state
/// changes.
#[async_trait]
pub trait TargetResolver: Send + Sync {
    async fn resolve(&self, actor: ActorId, raw: &str) -> Result<ActorId, TargetError>;
}

/// Narration delivery.
///
/// Delivery is fire-and-forget; a combat resolution never fails because a
/// recipient's connection dropped.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_to(&self, actor: ActorId, text: &str);
}

/// Opaque per-actor combat state persistence.
#[async_trait]
pub trait ActorStateRepository: Send + Sync {
    async fn load(&self, actor: ActorId) -> Result<Option<ActorRecord>, RepositoryError>;
    async fn save(&self, actor: ActorId, record: &ActorRecord) -> Result<(), RepositoryError>;
}

/// Resolver over a fixed name table. Useful for tests and scripted
/// scenarios.
#[derive(Debug, Default)]
pub struct StaticTargetResolver {
    names: HashMap<String, ActorId>,
}

impl StaticTargetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, actor: ActorId) -> Self {
        self.names.insert(name.into(), actor);
        self
    }
}

#[async_trait]
impl TargetResolver for StaticTargetResolver {
    async fn resolve(&self, _actor: ActorId, raw: &str) -> Result<ActorId, TargetError> {
        self.names
            .get(raw)
            .copied()
            .ok_or_else(|| TargetError::NoSuchTarget(raw.to_string()))
    }
}

/// Sink that drops every message.
#[derive(Debug, Default)]
pub struct NullMessageSink;

#[async_trait]
impl MessageSink for NullMessageSink {
    async fn send_to(&self, _actor: ActorId, _text: &str) {}
}

/// Repository that stores serialized records in process memory, the JSON
/// round-trip included so records exercise the same path as durable
/// backends.
#[derive(Debug, Default)]
pub struct InMemoryActorRepository {
    records: RwLock<HashMap<ActorId, String>>,
}

impl InMemoryActorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActorStateRepository for InMemoryActorRepository {
    async fn load(&self, actor: ActorId) -> Result<Option<ActorRecord>, RepositoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::Storage("record table lock poisoned".into()))?;
        match records.get(&actor) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, actor: ActorId, record: &ActorRecord) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(record)?;
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::Storage("record table lock poisoned".into()))?;
        records.insert(actor, json);
        Ok(())
    }
}
