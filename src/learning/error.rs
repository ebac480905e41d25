//! Error types for the learning agent.

use std::path::PathBuf;

/// Failures of the experience replay buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("replay capacity must be at least 1")]
    ZeroCapacity,
    #[error("cannot sample from an empty replay buffer")]
    Empty,
    #[error("state has {actual} features, buffer expects {expected}")]
    StateLength { expected: usize, actual: usize },
    #[error("transition index {index} outside stored region of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Invalid or unreadable agent configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by the agent to its frame loop.
#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
