//! Randomness used by the simulation.
//!
//! The policy never touches an RNG directly; every draw goes through a
//! [`Sampler`], so a run is fully determined by the sampling sequence it is fed.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BanditError, Result};

/// Source of the two kinds of draws the simulation needs.
pub trait Sampler {
    /// Draws an integer uniformly from `[lower, upper)`.
    ///
    /// Callers guarantee `lower < upper`.
    fn uniform_int(&mut self, lower: i64, upper: i64) -> i64;

    /// Draws an index from the categorical distribution described by
    /// `probabilities`.
    fn categorical(&mut self, probabilities: &[f64]) -> Result<usize>;
}

/// [`Sampler`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<StdRng> {
    /// Reproducible sampler: the same seed yields the same run.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Sampler for RngSampler<R> {
    fn uniform_int(&mut self, lower: i64, upper: i64) -> i64 {
        self.rng.gen_range(lower..upper)
    }

    fn categorical(&mut self, probabilities: &[f64]) -> Result<usize> {
        let distribution = WeightedIndex::new(probabilities)
            .map_err(|err| BanditError::Distribution(err.to_string()))?;
        Ok(distribution.sample(&mut self.rng))
    }
}
