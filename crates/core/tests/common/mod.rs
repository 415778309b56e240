//! Samplers and config builders shared by the integration tests.

#![allow(dead_code)]

use banditsim_core::{BanditError, Result, Sampler, SimulationConfig, SourceBounds};

/// Always takes the most likely branch; ties go to the higher index.
/// Uniform draws return the lower bound.
#[derive(Debug, Default)]
pub struct MostLikely {
    pub categorical_calls: usize,
}

impl Sampler for MostLikely {
    fn uniform_int(&mut self, lower: i64, _upper: i64) -> i64 {
        lower
    }

    fn categorical(&mut self, probabilities: &[f64]) -> Result<usize> {
        self.categorical_calls += 1;
        probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
            .ok_or_else(|| BanditError::Distribution("empty distribution".into()))
    }
}

/// Replays fixed rewards and picks; panics when the script runs out.
#[derive(Debug, Default)]
pub struct Scripted {
    pub rewards: Vec<i64>,
    pub picks: Vec<usize>,
}

impl Sampler for Scripted {
    fn uniform_int(&mut self, lower: i64, upper: i64) -> i64 {
        let reward = self.rewards.remove(0);
        assert!(
            (lower..upper).contains(&reward),
            "scripted reward {reward} outside {lower}..{upper}"
        );
        reward
    }

    fn categorical(&mut self, _probabilities: &[f64]) -> Result<usize> {
        Ok(self.picks.remove(0))
    }
}

pub fn config(
    sources: &[(i64, i64)],
    steps: usize,
    exploration_passes: usize,
    initial_epsilon: f64,
    decay_rate: f64,
) -> SimulationConfig {
    SimulationConfig {
        sources: sources
            .iter()
            .map(|&(lower, upper)| SourceBounds::new(lower, upper))
            .collect(),
        steps,
        exploration_passes,
        initial_epsilon: Some(initial_epsilon),
        decay_rate,
    }
}
