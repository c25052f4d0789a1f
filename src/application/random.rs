// Seeded random source for reproducible generation runs
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use uuid::Uuid;

pub const DEFAULT_SEED: u64 = 1_234_567_890;

/// Deterministic random source. Every generation run calls [`reseed`] first,
/// so two runs against a clean target produce identical data.
///
/// Not shared between threads: a task that needs randomness owns its own
/// instance or borrows the run's instance mutably.
///
/// [`reseed`]: SeededRandom::reseed
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the sequence from the construction seed.
    pub fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Uniform integer in `[from, to)`. When `from >= to` the result is `to`
    /// and no entropy is consumed.
    pub fn random_number(&mut self, from: i64, to: i64) -> i64 {
        if from >= to {
            return to;
        }
        self.rng.gen_range(from..to)
    }

    /// Uniform noise in `[-amplitude, amplitude]`. Zero amplitude draws nothing.
    pub fn noise(&mut self, amplitude: f64) -> f64 {
        if amplitude <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-1.0_f64..=1.0) * amplitude
    }

    /// Name-based UUID derived from 16 freshly drawn bytes.
    pub fn random_uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        Uuid::new_v3(&Uuid::NAMESPACE_OID, &bytes)
    }
}

impl Default for SeededRandom {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}
