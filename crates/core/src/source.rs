use serde::Deserialize;

use crate::config::SourceBounds;
use crate::error::ConfigError;
use crate::sampler::Sampler;

/// A single arm: emits integer rewards from a fixed half-open range and keeps
/// its own pull statistics.
///
/// Deserializes from its bounds only, through the same check as
/// [`RewardSource::new`]; statistics always start empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "SourceBounds")]
pub struct RewardSource {
    lower_bound: i64,
    upper_bound: i64,
    pull_count: u64,
    cumulative_return: i64,
    running_average: f64,
}

impl RewardSource {
    /// Rejects `lower >= upper`; an empty range could never be sampled.
    pub fn new(lower_bound: i64, upper_bound: i64) -> Result<Self, ConfigError> {
        if lower_bound >= upper_bound {
            return Err(ConfigError::InvalidBounds {
                index: None,
                lower: lower_bound,
                upper: upper_bound,
            });
        }
        Ok(Self::from_bounds(SourceBounds::new(lower_bound, upper_bound)))
    }

    /// Caller has already checked `lower < upper`.
    pub(crate) fn from_bounds(bounds: SourceBounds) -> Self {
        Self {
            lower_bound: bounds.lower,
            upper_bound: bounds.upper,
            pull_count: 0,
            cumulative_return: 0,
            running_average: 0.0,
        }
    }

    /// Samples a reward from `[lower_bound, upper_bound)` and folds it into
    /// the running statistics.
    ///
    /// The cumulative return must stay within `i64`;
    /// [`SimulationConfig::validate`](crate::SimulationConfig::validate)
    /// rejects runs that could leave it.
    pub fn pull<S: Sampler + ?Sized>(&mut self, sampler: &mut S) -> i64 {
        let reward = sampler.uniform_int(self.lower_bound, self.upper_bound);
        self.pull_count = self.pull_count.saturating_add(1);
        self.cumulative_return += reward;
        self.running_average = self.cumulative_return as f64 / self.pull_count as f64;
        reward
    }

    pub fn lower_bound(&self) -> i64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> i64 {
        self.upper_bound
    }

    pub fn pull_count(&self) -> u64 {
        self.pull_count
    }

    pub fn cumulative_return(&self) -> i64 {
        self.cumulative_return
    }

    /// Zero until the first pull.
    pub fn running_average(&self) -> f64 {
        self.running_average
    }
}

impl TryFrom<SourceBounds> for RewardSource {
    type Error = ConfigError;

    fn try_from(bounds: SourceBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.lower, bounds.upper)
    }
}
