//! Injectable random source
//!
//! Simulation code never reaches for an ambient RNG. Callers hand in a
//! `RandomSource`; runs replay exactly from a seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// A source of uniform numbers in `[0, 1)`
pub trait RandomSource {
    fn random(&mut self) -> f64;

    /// Uniform number in `[-spread, spread)`
    fn jitter(&mut self, spread: f64) -> f64 {
        (self.random() * 2.0 - 1.0) * spread
    }
}

/// Seeded PCG source used by live sessions
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: Pcg32,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn random(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Always returns the same value; handy for pinning restitution in tests
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn random(&mut self) -> f64 {
        self.0
    }
}
