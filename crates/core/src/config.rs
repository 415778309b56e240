use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ConfigError;

const fn default_steps() -> usize {
    15_000
}

const fn default_exploration_passes() -> usize {
    25
}

const fn default_decay_rate() -> f64 {
    0.998
}

fn default_sources() -> Vec<SourceBounds> {
    vec![
        SourceBounds::new(-300, 100),
        SourceBounds::new(-5, 10),
        SourceBounds::new(-2, 5),
    ]
}

/// Half-open reward range `[lower, upper)` of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBounds {
    pub lower: i64,
    pub upper: i64,
}

impl SourceBounds {
    pub const fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }
}

impl fmt::Display for SourceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected LOW:HIGH integer bounds, got '{0}'")]
pub struct ParseBoundsError(String);

impl FromStr for SourceBounds {
    type Err = ParseBoundsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lower, upper) = s
            .split_once(':')
            .ok_or_else(|| ParseBoundsError(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| ParseBoundsError(s.to_string()))
        };
        Ok(Self::new(parse(lower)?, parse(upper)?))
    }
}

/// Raw simulation parameters. Turn into a [`ValidatedConfig`] with
/// [`SimulationConfig::validate`] before running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceBounds>,
    /// Total number of pulls (N).
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Round-robin passes over every source before exploitation starts.
    #[serde(default = "default_exploration_passes")]
    pub exploration_passes: usize,
    /// `None` means `1 / sources.len()`.
    #[serde(default)]
    pub initial_epsilon: Option<f64>,
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            steps: default_steps(),
            exploration_passes: default_exploration_passes(),
            initial_epsilon: None,
            decay_rate: default_decay_rate(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if let Some((index, bounds)) = self
            .sources
            .iter()
            .enumerate()
            .find(|(_, bounds)| bounds.lower >= bounds.upper)
        {
            return Err(ConfigError::InvalidBounds {
                index: Some(index),
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
        if self.steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }

        check_reward_range(&self.sources, self.steps)?;

        let k = self.sources.len();
        let exploration_steps = self.exploration_passes.checked_mul(k).ok_or(
            ConfigError::ExplorationOverflow {
                passes: self.exploration_passes,
                sources: k,
            },
        )?;
        if exploration_steps > self.steps {
            return Err(ConfigError::ExplorationExceedsSteps {
                passes: self.exploration_passes,
                sources: k,
                required: exploration_steps,
                steps: self.steps,
            });
        }

        let initial_epsilon = self.initial_epsilon.unwrap_or(1.0 / k as f64);
        if !(0.0..=1.0).contains(&initial_epsilon) {
            return Err(ConfigError::Epsilon(initial_epsilon));
        }
        // Written so NaN fails too.
        if !(self.decay_rate > 0.0 && self.decay_rate <= 1.0) {
            return Err(ConfigError::DecayRate(self.decay_rate));
        }

        Ok(ValidatedConfig {
            sources: self.sources,
            steps: self.steps,
            exploration_passes: self.exploration_passes,
            exploration_steps,
            initial_epsilon,
            decay_rate: self.decay_rate,
        })
    }
}

// Every partial sum of `steps` rewards lies between `steps * min(lowest, 0)`
// and `steps * max(highest, 0)`; both ends must fit in `i64`.
fn check_reward_range(sources: &[SourceBounds], steps: usize) -> Result<(), ConfigError> {
    let lowest = sources.iter().map(|b| b.lower).min().unwrap_or(0);
    let highest = sources.iter().map(|b| b.upper - 1).max().unwrap_or(0);
    let n = steps as i128;
    let fits = |extreme: i64| {
        n.checked_mul(i128::from(extreme))
            .is_some_and(|sum| sum >= i128::from(i64::MIN) && sum <= i128::from(i64::MAX))
    };
    if fits(lowest.min(0)) && fits(highest.max(0)) {
        Ok(())
    } else {
        Err(ConfigError::RewardOverflow {
            steps,
            lowest,
            highest,
        })
    }
}

/// Parameters that passed validation. Only obtainable through
/// [`SimulationConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedConfig {
    sources: Vec<SourceBounds>,
    steps: usize,
    exploration_passes: usize,
    exploration_steps: usize,
    initial_epsilon: f64,
    decay_rate: f64,
}

impl ValidatedConfig {
    pub fn sources(&self) -> &[SourceBounds] {
        &self.sources
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn exploration_passes(&self) -> usize {
        self.exploration_passes
    }

    /// `exploration_passes * source_count`; the first exploitation step.
    pub fn exploration_steps(&self) -> usize {
        self.exploration_steps
    }

    pub fn initial_epsilon(&self) -> f64 {
        self.initial_epsilon
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }
}
