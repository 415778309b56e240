use serde::{Deserialize, Serialize};

use crate::config::ValidatedConfig;
use crate::simulator::StepRecord;
use crate::source::RewardSource;

/// The four aligned per-step series of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub reward: Vec<i64>,
    pub cumulative_reward: Vec<i64>,
    pub chosen_index: Vec<usize>,
    pub epsilon_trace: Vec<f64>,
}

impl Series {
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            reward: Vec::with_capacity(steps),
            cumulative_reward: Vec::with_capacity(steps),
            chosen_index: Vec::with_capacity(steps),
            epsilon_trace: Vec::with_capacity(steps),
        }
    }

    pub fn push(&mut self, record: &StepRecord) {
        self.reward.push(record.reward);
        self.cumulative_reward.push(record.cumulative);
        self.chosen_index.push(record.chosen);
        self.epsilon_trace.push(record.epsilon);
    }

    pub fn len(&self) -> usize {
        self.reward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}

/// End-of-run statistics of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub index: usize,
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub pulls: u64,
    pub cumulative_return: i64,
    pub running_average: f64,
}

impl SourceSummary {
    pub fn from_source(index: usize, source: &RewardSource) -> Self {
        Self {
            index,
            lower_bound: source.lower_bound(),
            upper_bound: source.upper_bound(),
            pulls: source.pull_count(),
            cumulative_return: source.cumulative_return(),
            running_average: source.running_average(),
        }
    }
}

/// Panels a plotter draws: cumulative reward; reward per pull against the
/// mean line; chosen source (1-based) overlaid with epsilon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub cumulative: Vec<i64>,
    pub reward: Vec<i64>,
    pub mean_line: Vec<f64>,
    pub chosen_one_based: Vec<usize>,
    pub epsilon: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub config: ValidatedConfig,
    pub series: Series,
    pub sources: Vec<SourceSummary>,
    pub best_index: usize,
    pub final_epsilon: f64,
}

impl SimulationOutcome {
    pub fn total_reward(&self) -> i64 {
        self.series.cumulative_reward.last().copied().unwrap_or(0)
    }

    /// Total reward over all steps, not just exploitation.
    pub fn mean_reward(&self) -> f64 {
        if self.series.is_empty() {
            0.0
        } else {
            self.total_reward() as f64 / self.series.len() as f64
        }
    }

    pub fn plot_series(&self) -> PlotSeries {
        let steps = self.series.len();
        PlotSeries {
            cumulative: self.series.cumulative_reward.clone(),
            reward: self.series.reward.clone(),
            mean_line: vec![self.mean_reward(); steps],
            chosen_one_based: self.series.chosen_index.iter().map(|i| i + 1).collect(),
            epsilon: self.series.epsilon_trace.clone(),
        }
    }
}
