use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Injected randomness capability.
///
/// The fallback predictor and the mock image features draw from this seam so
/// tests can substitute a seeded source and assert deterministically.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in [0, 1)
    fn next_f64(&self) -> f64;

    /// Uniform index in [0, len)
    fn next_index(&self, len: usize) -> usize;
}

/// Production source backed by the thread-local RNG
#[derive(Debug, Default, Clone)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn next_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Seeded source for reproducible runs and tests
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }

    fn next_index(&self, len: usize) -> usize {
        self.rng.lock().gen_range(0..len)
    }
}
