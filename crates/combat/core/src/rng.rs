//! Random number source for combat rolls.
//!
//! The resolver is parameterized over a small trait so tests can supply a
//! seeded deterministic stream and replay exact roll sequences. The runtime
//! crate provides an OS-entropy implementation for live play.

/// Source of randomness consumed by hit, cast, and damage rolls.
pub trait CombatRng: Send {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Roll a die with `sides` faces (1..=sides).
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides <= 1 {
            return 1;
        }
        (self.next_u32() % sides) + 1
    }

    /// Uniform value in `[min, max]` inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        min + self.next_u32() % (max - min + 1)
    }
}

/// SplitMix64-based deterministic generator.
///
/// Small state, good statistical quality, and trivially seedable, which is
/// all the combat rolls need. Given the same seed the sequence is identical,
/// so resolution tests can assert exact outcomes.
#[derive(Clone, Copy, Debug)]
pub struct SplitMixRng {
    state: u64,
}

impl SplitMixRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl CombatRng for SplitMixRng {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        (z ^ (z >> 31)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SplitMixRng::new(42);
        let mut b = SplitMixRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn range_is_inclusive_and_bounded() {
        let mut rng = SplitMixRng::new(7);
        for _ in 0..256 {
            let v = rng.range(3, 9);
            assert!((3..=9).contains(&v));
        }
        assert_eq!(rng.range(5, 5), 5);
    }

    #[test]
    fn uniform_stays_below_one() {
        let mut rng = SplitMixRng::new(1);
        for _ in 0..256 {
            let v = rng.uniform();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
