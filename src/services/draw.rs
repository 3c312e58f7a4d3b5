use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform pick over a deterministically ordered candidate list. Judge
/// rotation and power-type awards draw through this seam instead of
/// store-native randomness, so tests can pin or seed the outcome.
pub trait Draw: Send + Sync {
    /// Index in `0..len`; `len` must be non-zero.
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDraw;

impl Draw for RandomDraw {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Reproducible draw backed by a seeded PRNG.
#[derive(Debug)]
pub struct SeededDraw {
    rng: Mutex<StdRng>,
}

impl SeededDraw {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Draw for SeededDraw {
    fn pick(&self, len: usize) -> usize {
        self.rng.lock().unwrap().random_range(0..len)
    }
}

/// Always picks the same index (clamped); for tests that need one exact
/// outcome rather than a distribution.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub usize);

impl Draw for FixedDraw {
    fn pick(&self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}
