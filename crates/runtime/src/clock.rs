//! Session clock anchoring [`GameTime`] to tokio's timer.
//!
//! Built on `tokio::time::Instant`, so paused-time tests drive the combat
//! clock through `tokio::time::advance` exactly like real elapsed time.

use std::time::Duration;

use tokio::time::Instant;

use combat_core::GameTime;

/// Monotonic clock measuring time since the executor started.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeClock {
    origin: Instant,
}

impl RuntimeClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> GameTime {
        GameTime::from_millis(self.origin.elapsed().as_millis() as u64)
    }

    /// The tokio instant corresponding to a combat timestamp.
    pub fn instant_at(&self, time: GameTime) -> Instant {
        self.origin + Duration::from_millis(time.as_millis())
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}
