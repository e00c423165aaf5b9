//! Randomized per-row refresh delays
//!
//! Delays are exponential inter-arrival samples around a target mean, so a
//! table of rows refreshes like independent Poisson arrivals instead of in
//! lockstep. Each sample is clamped to `[0.1 * mean, 10 * mean]` so a
//! countdown is never instant and never absurdly long.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Delays generated per rendered row
pub const DEFAULT_BATCH_SIZE: usize = 10;

const MIN_FACTOR: f64 = 0.1;
const MAX_FACTOR: f64 = 10.0;

/// Draw one delay in milliseconds.
///
/// A non-positive or non-finite mean yields `0`. A uniform draw of exactly
/// zero maps to the upper bound instead of `-ln(0) = inf`.
pub fn next_delay<R: Rng + ?Sized>(rng: &mut R, target_mean_ms: f64) -> u64 {
    if !target_mean_ms.is_finite() || target_mean_ms <= 0.0 {
        return 0;
    }

    let min = MIN_FACTOR * target_mean_ms;
    let max = MAX_FACTOR * target_mean_ms;

    let u: f64 = rng.gen();
    let raw = if u <= 0.0 {
        max
    } else {
        -u.ln() * target_mean_ms
    };

    raw.clamp(min, max) as u64
}

/// Draw `count` independent delays
pub fn generate_batch<R: Rng + ?Sized>(rng: &mut R, target_mean_ms: f64, count: usize) -> Vec<u64> {
    (0..count).map(|_| next_delay(rng, target_mean_ms)).collect()
}

/// Thread-safe delay generator with a fixed target mean
///
/// Owns its own RNG behind a mutex; the lock is held only for the draws of a
/// single call.
pub struct RefreshScheduler {
    target_mean_ms: f64,
    rng: Mutex<StdRng>,
}

impl RefreshScheduler {
    pub fn new(target_mean_ms: f64) -> Self {
        Self {
            target_mean_ms,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence, for tests and demos
    pub fn with_seed(target_mean_ms: f64, seed: u64) -> Self {
        Self {
            target_mean_ms,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn target_mean_ms(&self) -> f64 {
        self.target_mean_ms
    }

    pub fn next_delay(&self) -> u64 {
        next_delay(&mut *self.rng.lock(), self.target_mean_ms)
    }

    pub fn generate_batch(&self, count: usize) -> Vec<u64> {
        generate_batch(&mut *self.rng.lock(), self.target_mean_ms, count)
    }

    /// The standard ten-delay queue embedded into each ticker row
    pub fn delay_queue(&self) -> Vec<u64> {
        self.generate_batch(DEFAULT_BATCH_SIZE)
    }
}
