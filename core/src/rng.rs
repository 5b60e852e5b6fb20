//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call a platform RNG. All randomness
//! flows through the session's single GameRng, seeded from the master
//! seed chosen at construction. Two sessions built from the same seed
//! draw identical quest pools.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

pub struct GameRng {
    inner: Pcg64Mcg,
}

impl GameRng {
    pub fn new(master_seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(master_seed),
        }
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform in-place permutation (Fisher–Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_u64_below(i as u64 + 1) as usize;
            slice.swap(i, j);
        }
    }
}
