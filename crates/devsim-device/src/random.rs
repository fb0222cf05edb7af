//! Random sources behind fault decisions.
//!
//! Production uses the thread RNG; tests substitute a seeded generator or a
//! fixed sequence so drop/corrupt outcomes are reproducible.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Thread-local, non-deterministic draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic draws from a seeded generator.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// An empty list always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            pos: 0,
        }
    }

    /// Number of draws taken so far.
    pub fn draws(&self) -> usize {
        self.pos
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value
    }
}

/// A random source shared by every clone of this handle.
#[derive(Clone)]
pub struct SharedRandom {
    inner: Arc<Mutex<Box<dyn RandomSource + Send>>>,
}

impl SharedRandom {
    pub fn new(source: impl RandomSource + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(source))),
        }
    }
}

impl Default for SharedRandom {
    fn default() -> Self {
        Self::new(ThreadRandom)
    }
}

impl RandomSource for SharedRandom {
    fn next_f64(&mut self) -> f64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_f64()
    }
}

impl fmt::Debug for SharedRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRandom").finish_non_exhaustive()
    }
}
