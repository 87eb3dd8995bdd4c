//! Seeded random source contract
//!
//! Growth consumes randomness only through [`RandomSource`]: one sequential
//! stream of floats in `[0, 1)` with deterministic reset/seed control. The
//! draw order (per island, per iteration, in array order) is part of the
//! reproducibility contract, so nothing in this crate reaches past the
//! trait into generator internals.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic seeded stream of floats in `[0, 1)`.
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next(&mut self) -> f32;

    /// Rewind the stream to the start of the current seed.
    fn reset(&mut self);

    /// Install a new seed and rewind.
    fn set_seed(&mut self, seed: u64);

    /// Uniform index in `[0, n)`. `n` must be non-zero.
    fn index(&mut self, n: usize) -> usize {
        ((self.next() as f64 * n as f64) as usize).min(n - 1)
    }

    /// Fisher-Yates shuffle driven by the `[0, 1)` stream.
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.index(i + 1);
            slice.swap(i, j);
        }
    }
}

/// [`RandomSource`] backed by `ChaCha8Rng`.
pub struct ChaChaSource {
    seed: u64,
    rng: ChaCha8Rng,
}

impl ChaChaSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for ChaChaSource {
    fn next(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_is_deterministic_and_in_range() {
        let mut a = ChaChaSource::new(42);
        let mut b = ChaChaSource::new(42);
        for _ in 0..100 {
            let va = a.next();
            assert_eq!(va, b.next());
            assert!((0.0..1.0).contains(&va));
        }
    }

    #[test]
    fn test_reset_rewinds_the_stream() {
        let mut src = ChaChaSource::new(7);
        let first: Vec<f32> = (0..10).map(|_| src.next()).collect();
        src.reset();
        let second: Vec<f32> = (0..10).map(|_| src.next()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_seed_changes_the_stream() {
        let mut src = ChaChaSource::new(1);
        let a = src.next();
        src.set_seed(2);
        let b = src.next();
        src.set_seed(1);
        assert_eq!(src.next(), a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_index_stays_in_range() {
        let mut src = ChaChaSource::new(99);
        for _ in 0..1000 {
            assert!(src.index(7) < 7);
        }
        assert_eq!(src.index(1), 0);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut src = ChaChaSource::new(5);
        let mut v: Vec<u32> = (0..32).collect();
        src.shuffle(&mut v);
        let mut sorted = v.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<u32>>());

        // Same seed, same permutation.
        src.reset();
        let mut w: Vec<u32> = (0..32).collect();
        src.shuffle(&mut w);
        assert_eq!(v, w);
    }
}
