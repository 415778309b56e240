use thiserror::Error;

pub type Result<T> = std::result::Result<T, BanditError>;

/// Rejected simulation parameters. Always raised before the first pull.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one reward source is required")]
    NoSources,

    /// `index` is the position in the configured source list, when known.
    #[error("{}lower bound {lower} must be below upper bound {upper}", source_prefix(.index))]
    InvalidBounds {
        index: Option<usize>,
        lower: i64,
        upper: i64,
    },

    #[error("step count must be greater than zero")]
    ZeroSteps,

    #[error("{passes} exploration passes over {sources} sources need {required} steps, only {steps} configured")]
    ExplorationExceedsSteps {
        passes: usize,
        sources: usize,
        required: usize,
        steps: usize,
    },

    #[error("{passes} exploration passes over {sources} sources overflow the step counter")]
    ExplorationOverflow { passes: usize, sources: usize },

    #[error("{steps} pulls from rewards in [{lowest}, {highest}] can overflow the cumulative reward")]
    RewardOverflow {
        steps: usize,
        lowest: i64,
        highest: i64,
    },

    #[error("epsilon {0} is outside [0, 1]")]
    Epsilon(f64),

    #[error("decay rate {0} is outside (0, 1]")]
    DecayRate(f64),
}

fn source_prefix(index: &Option<usize>) -> String {
    index.map(|i| format!("source {i}: ")).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum BanditError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Serde JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
