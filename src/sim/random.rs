//! Injectable random source for spawn rolls
//!
//! The field only ever asks for uniform draws in [0, 1); the seeded PCG source
//! is used at runtime and tests script exact sequences.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform random draws in [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;

    /// Uniform draw in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_unit() * (max - min)
    }
}

/// Seeded PCG stream (reproducible per seed)
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
    fn next_unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<f32>,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            values: values.into_iter().map(|v| v.clamp(0.0, 1.0)).collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            None => 0.0,
        }
    }
}
