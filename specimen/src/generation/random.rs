//! The seeded random source shared by everything in one call

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const UPPER_ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Deterministic random source: the same seed replays the same sequence
pub struct Random {
    rng:  StdRng,
    seed: u64,
}

impl Random {
    /// Source seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this source was created with
    pub const fn seed(&self) -> u64 { self.seed }

    /// Uniform integer in `min..=max`; returns `min` when the range is empty
    pub fn int_range(&mut self, min: i128, max: i128) -> i128 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform size in `min..=max`; returns `min` when the range is empty
    pub fn usize_range(&mut self, min: usize, max: usize) -> usize {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform float in `min..max`; returns `min` when the range is empty
    pub fn f64_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Fair coin
    pub fn bool(&mut self) -> bool { self.rng.r#gen() }

    /// True with the given probability, clamped to `[0, 1]`
    pub fn dice_roll(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        self.rng.gen_bool(probability.min(1.0))
    }

    /// Uniformly chosen item, `None` for an empty slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> { items.choose(&mut self.rng) }

    /// Upper-case ASCII letter
    pub fn upper_char(&mut self) -> char {
        char::from(UPPER_ALPHA[self.rng.gen_range(0..UPPER_ALPHA.len())])
    }

    /// Upper-case ASCII letters of the given length
    pub fn upper_alpha(&mut self, len: usize) -> String { (0..len).map(|_| self.upper_char()).collect() }

    /// Seed for a derived source, e.g. the next item of `create_many`
    pub fn next_seed(&mut self) -> u64 { self.rng.r#gen() }

    /// The underlying generator, for callers that need the full `rand` API
    pub const fn rng(&mut self) -> &mut StdRng { &mut self.rng }
}
