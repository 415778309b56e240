//! Two-phase epsilon-greedy run over a fixed set of reward sources.
//!
//! Steps `0..exploration_steps` pull every source round-robin. The remaining
//! steps draw from a categorical distribution that puts `1 - epsilon` on the
//! current best source and spreads `epsilon` evenly over the others, decaying
//! epsilon geometrically after every draw.

use tracing::{debug, info, trace};

use crate::config::{SimulationConfig, ValidatedConfig};
use crate::error::{BanditError, Result};
use crate::outcome::{Series, SimulationOutcome, SourceSummary};
use crate::sampler::Sampler;
use crate::source::RewardSource;

/// State threaded from one step into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunState {
    pub epsilon: f64,
    /// Greediness target. Starts at 0, which is what exploitation uses when
    /// there was no exploration at all.
    pub best_index: usize,
    pub cumulative: i64,
}

impl RunState {
    pub fn initial(config: &ValidatedConfig) -> Self {
        Self {
            epsilon: config.initial_epsilon(),
            best_index: 0,
            cumulative: 0,
        }
    }
}

/// What one step appends to the output series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    pub chosen: usize,
    pub reward: i64,
    pub cumulative: i64,
    pub epsilon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Exploration,
    Exploitation,
}

/// Selection probabilities for the exploitation draw.
///
/// With a single source the distribution is `[1.0]`.
pub fn selection_probabilities(k: usize, best_index: usize, epsilon: f64) -> Vec<f64> {
    if k == 1 {
        return vec![1.0];
    }
    let mut probabilities = vec![epsilon / (k - 1) as f64; k];
    probabilities[best_index] = 1.0 - epsilon;
    probabilities
}

// Only the source that was just pulled can take over; the other averages did
// not move.
fn displace_best(sources: &[RewardSource], best_index: usize, pulled: usize) -> usize {
    if sources[pulled].running_average() > sources[best_index].running_average() {
        pulled
    } else {
        best_index
    }
}

/// Pulls `index` as part of the round-robin warm start. Epsilon is untouched.
pub fn explore_step<S: Sampler + ?Sized>(
    state: RunState,
    sources: &mut [RewardSource],
    index: usize,
    sampler: &mut S,
) -> (RunState, StepRecord) {
    let reward = sources[index].pull(sampler);
    let next = RunState {
        epsilon: state.epsilon,
        best_index: displace_best(sources, state.best_index, index),
        cumulative: state.cumulative + reward,
    };
    let record = StepRecord {
        chosen: index,
        reward,
        cumulative: next.cumulative,
        epsilon: next.epsilon,
    };
    (next, record)
}

/// One epsilon-greedy draw followed by the decay of epsilon. The recorded
/// epsilon is the decayed value.
pub fn exploit_step<S: Sampler + ?Sized>(
    state: RunState,
    sources: &mut [RewardSource],
    decay_rate: f64,
    sampler: &mut S,
) -> Result<(RunState, StepRecord)> {
    let k = sources.len();
    let chosen = if k == 1 {
        0
    } else {
        let probabilities = selection_probabilities(k, state.best_index, state.epsilon);
        let chosen = sampler.categorical(&probabilities)?;
        if chosen >= k {
            return Err(BanditError::Distribution(format!(
                "sampler returned index {chosen} for {k} sources"
            )));
        }
        chosen
    };

    let reward = sources[chosen].pull(sampler);
    let next = RunState {
        epsilon: state.epsilon * decay_rate,
        best_index: displace_best(sources, state.best_index, chosen),
        cumulative: state.cumulative + reward,
    };
    let record = StepRecord {
        chosen,
        reward,
        cumulative: next.cumulative,
        epsilon: next.epsilon,
    };
    Ok((next, record))
}

#[derive(Debug, Clone)]
pub struct BanditSimulator {
    config: ValidatedConfig,
    sources: Vec<RewardSource>,
}

impl BanditSimulator {
    /// Validates `config`; nothing is pulled if this fails.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        Ok(Self::from_validated(config.validate()?))
    }

    pub fn from_validated(config: ValidatedConfig) -> Self {
        let sources = config
            .sources()
            .iter()
            .copied()
            .map(RewardSource::from_bounds)
            .collect();
        Self { config, sources }
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn sources(&self) -> &[RewardSource] {
        &self.sources
    }

    pub fn phase_at(&self, t: usize) -> Phase {
        if t < self.config.exploration_steps() {
            Phase::Exploration
        } else {
            Phase::Exploitation
        }
    }

    /// Runs all `steps` pulls. The simulator is consumed: either every series
    /// is filled or the caller gets an error and no partial output.
    pub fn run<S: Sampler + ?Sized>(mut self, sampler: &mut S) -> Result<SimulationOutcome> {
        let k = self.sources.len();
        let steps = self.config.steps();
        let decay_rate = self.config.decay_rate();
        debug!(
            sources = k,
            steps,
            exploration_passes = self.config.exploration_passes(),
            epsilon = self.config.initial_epsilon(),
            decay_rate,
            "starting bandit run"
        );

        let mut state = RunState::initial(&self.config);
        let mut series = Series::with_capacity(steps);

        for _ in 0..self.config.exploration_passes() {
            for index in 0..k {
                let (next, record) = explore_step(state, &mut self.sources, index, sampler);
                series.push(&record);
                state = next;
            }
        }
        debug!(
            t = series.len(),
            next_phase = ?self.phase_at(series.len()),
            best_index = state.best_index,
            cumulative = state.cumulative,
            "exploration finished"
        );

        for t in series.len()..steps {
            let (next, record) = exploit_step(state, &mut self.sources, decay_rate, sampler)?;
            trace!(
                t,
                chosen = record.chosen,
                best_index = next.best_index,
                epsilon = next.epsilon,
                "exploitation step"
            );
            series.push(&record);
            state = next;
        }

        let sources = self
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| SourceSummary::from_source(index, source))
            .collect();
        let outcome = SimulationOutcome {
            config: self.config,
            series,
            sources,
            best_index: state.best_index,
            final_epsilon: state.epsilon,
        };
        info!(
            total_reward = outcome.total_reward(),
            mean_reward = outcome.mean_reward(),
            best_index = outcome.best_index,
            final_epsilon = outcome.final_epsilon,
            "bandit run complete"
        );
        Ok(outcome)
    }
}
