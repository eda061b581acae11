//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through LifetimeRng instances derived from
//! the single master seed supplied to the engine.
//!
//! Each lifetime gets its own RNG stream, seeded deterministically
//! from (master_seed XOR lifetime_index). This means:
//!   - Raising the run count never changes earlier runs' streams.
//!   - Any single lifetime is fully reproducible in isolation, which
//!     also lets a parallel fold replay runs in any order.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// The deterministic RNG stream for a single lifetime.
pub struct LifetimeRng {
    inner: Pcg64Mcg,
}

impl LifetimeRng {
    /// Create the stream for one lifetime from the master seed and
    /// the lifetime's stable index. The index must never change once
    /// assigned.
    pub fn new(master_seed: u64, lifetime_index: u64) -> Self {
        let derived_seed =
            master_seed ^ (lifetime_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
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
}

/// Factory for all lifetime streams of a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_lifetime(&self, lifetime_index: u64) -> LifetimeRng {
        LifetimeRng::new(self.master_seed, lifetime_index)
    }
}
