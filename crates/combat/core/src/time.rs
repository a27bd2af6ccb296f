//! Session-relative time used by the cooldown state machine.
//!
//! The core never reads a wall clock. Every operation that depends on time
//! takes a [`GameTime`] argument supplied by the caller, which keeps the
//! scheduler pure and lets tests drive timers explicitly. The runtime crate
//! anchors `GameTime` to tokio's (pausable) clock.

use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Milliseconds elapsed since the start of the combat session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTime(pub u64);

impl GameTime {
    pub const ZERO: Self = Self(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Duration elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_since(self, earlier: GameTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// True if this instant is strictly after `other`.
    pub fn is_after(self, other: GameTime) -> bool {
        self.0 > other.0
    }
}

impl Add<Duration> for GameTime {
    type Output = GameTime;

    fn add(self, rhs: Duration) -> GameTime {
        GameTime(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
