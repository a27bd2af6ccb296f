//! Live randomness source for combat rolls.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use combat_core::CombatRng;

/// OS-entropy-seeded generator used outside tests.
#[derive(Debug)]
pub struct EntropyRng(StdRng);

impl EntropyRng {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatRng for EntropyRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}
