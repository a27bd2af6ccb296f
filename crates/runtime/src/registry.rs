//! Hot-swappable registry handle.
//!
//! Registries are immutable once built; reloading content means building a
//! fresh [`ActionRegistry`] and swapping the shared `Arc`. Invocations that
//! already resolved a definition keep executing against the old snapshot.

use std::sync::{Arc, RwLock};

use combat_core::ActionRegistry;

/// Shared, atomically replaceable registry snapshot.
#[derive(Debug)]
pub struct SharedRegistry {
    inner: RwLock<Arc<ActionRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            inner: RwLock::new(Arc::new(registry)),
        }
    }

    /// Current snapshot. Lookups performed against one snapshot stay
    /// internally consistent even while a replace runs.
    pub fn snapshot(&self) -> Arc<ActionRegistry> {
        // A poisoned lock still holds a valid snapshot; swap-only writers
        // cannot leave it half-updated.
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a new registry, returning the snapshot it replaced.
    pub fn replace(&self, registry: ActionRegistry) -> Arc<ActionRegistry> {
        let next = Arc::new(registry);
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
