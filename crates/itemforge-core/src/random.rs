//! Pseudo-random source
//!
//! All rolls go through [`RandomSource`] so tests and replays can inject a
//! deterministic source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send {
    /// True with `success_percent` percent probability (0 - 100)
    fn next_bool(&mut self, success_percent: u32) -> bool;

    /// Uniform index in `0..len`; `len` is never 0
    fn next_index(&mut self, len: usize) -> usize;
}

/// Uniformly picks one of `candidates`
pub fn select_random<'a, T>(rng: &mut dyn RandomSource, candidates: &'a [T]) -> Option<&'a T> {
    if candidates.is_empty() {
        return None;
    }
    let index = rng.next_index(candidates.len()).min(candidates.len() - 1);
    candidates.get(index)
}

/// Production random source backed by `StdRng`
pub struct GameRandom {
    rng: StdRng,
}

impl GameRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for GameRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for GameRandom {
    fn next_bool(&mut self, success_percent: u32) -> bool {
        if success_percent >= 100 {
            return true;
        }
        self.rng.gen_range(0..100) < success_percent
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }
}

/// Deterministic source: every roll between 1 and 99 percent yields the same
/// answer. 0 and 100 percent keep their certain outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    pub succeed: bool,
    pub index: usize,
}

impl FixedRandom {
    pub fn succeeding() -> Self {
        Self { succeed: true, index: 0 }
    }

    pub fn failing() -> Self {
        Self { succeed: false, index: 0 }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

impl RandomSource for FixedRandom {
    fn next_bool(&mut self, success_percent: u32) -> bool {
        match success_percent {
            0 => false,
            p if p >= 100 => true,
            _ => self.succeed,
        }
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }
}
