use std::path::PathBuf;

/// Errors raised while loading, running or soaking a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
    #[error("step {step}: expectation failed: {message}")]
    Expectation { step: usize, message: String },
    #[error("soak (seed {seed}) broke an invariant at operation {operation}: {message}")]
    Invariant {
        seed: u64,
        operation: u64,
        message: String,
    },
}
