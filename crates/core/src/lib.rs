//! Epsilon-greedy multi-armed bandit simulation with decaying exploration.
//!
//! A run pulls every [`RewardSource`] round-robin for a fixed number of
//! passes, then switches to epsilon-greedy selection where epsilon shrinks by
//! a constant factor after each pull. All randomness comes from an injected
//! [`Sampler`].

/// Simulation parameters and their validation.
pub mod config;
pub mod error;
/// JSON and CSV hand-off of finished runs.
pub mod export;
/// Series and summaries produced by a run.
pub mod outcome;
pub mod sampler;
/// Two-phase run loop and its step functions.
pub mod simulator;
pub mod source;

pub use config::{ParseBoundsError, SimulationConfig, SourceBounds, ValidatedConfig};
pub use error::{BanditError, ConfigError, Result};
pub use outcome::{PlotSeries, Series, SimulationOutcome, SourceSummary};
pub use sampler::{RngSampler, Sampler};
pub use simulator::{
    explore_step, exploit_step, selection_probabilities, BanditSimulator, Phase, RunState,
    StepRecord,
};
pub use source::RewardSource;
