//! Construction-time configuration of the agent.
//!
//! Values come from `Default`, optionally replaced by a JSON file and then by
//! `DQN_*` environment variables. Everything is fixed once the agent is built.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::learning::environment::DetailLevels;
use crate::learning::error::ConfigError;
use crate::learning::params::{
    DEFAULT_BATCH_SIZE, DEFAULT_EPSILON_DECAY, DEFAULT_EPSILON_FLOOR, DEFAULT_GAMMA,
    DEFAULT_INITIAL_EPSILON, DEFAULT_REPLAY_CAPACITY, DEFAULT_STUCK_FRAMES,
    DEFAULT_TRAIN_INTERVAL, FEATURE_LEN, MAX_DETAIL_LEVEL,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Transitions held by the replay buffer.
    pub replay_capacity: usize,
    /// Width of every stored state.
    pub feature_len: usize,
    /// Discount factor of the TD target.
    pub gamma: f64,
    /// Exploration probability at construction.
    pub initial_epsilon: f64,
    /// Multiplier applied to epsilon after each exploratory pick.
    pub epsilon_decay: f64,
    /// Lower bound for epsilon. Zero reproduces unbounded decay.
    pub epsilon_floor: f64,
    /// Frames without movement before the avatar counts as stuck.
    pub stuck_frames: u32,
    /// Zoom levels requested from the environment.
    pub detail: DetailLevels,
    /// Transitions per training minibatch.
    pub batch_size: usize,
    /// Frames between training steps.
    pub train_interval: u64,
    /// Seed for the agent's generator; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            replay_capacity: DEFAULT_REPLAY_CAPACITY,
            feature_len: FEATURE_LEN,
            gamma: DEFAULT_GAMMA,
            initial_epsilon: DEFAULT_INITIAL_EPSILON,
            epsilon_decay: DEFAULT_EPSILON_DECAY,
            epsilon_floor: DEFAULT_EPSILON_FLOOR,
            stuck_frames: DEFAULT_STUCK_FRAMES,
            detail: DetailLevels::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            train_interval: DEFAULT_TRAIN_INTERVAL,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Loads a config from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid JSON for this struct.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Applies `DQN_*` environment overrides on top of `self`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        override_from_env("DQN_GAMMA", &mut self.gamma);
        override_from_env("DQN_EPSILON", &mut self.initial_epsilon);
        override_from_env("DQN_EPSILON_DECAY", &mut self.epsilon_decay);
        override_from_env("DQN_EPSILON_FLOOR", &mut self.epsilon_floor);
        override_from_env("DQN_REPLAY_CAPACITY", &mut self.replay_capacity);
        override_from_env("DQN_BATCH_SIZE", &mut self.batch_size);
        if let Ok(raw) = env::var("DQN_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => warn!(var = "DQN_SEED", value = %raw, "ignoring unparsable override"),
            }
        }
        self
    }

    /// Checks every field against its admissible range.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replay_capacity == 0 {
            return Err(invalid("replay_capacity", "must be at least 1"));
        }
        if self.feature_len != FEATURE_LEN {
            return Err(invalid(
                "feature_len",
                format!("encoder produces {FEATURE_LEN} features, got {}", self.feature_len),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(invalid("gamma", "must lie in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.initial_epsilon) {
            return Err(invalid("initial_epsilon", "must lie in [0, 1]"));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(invalid("epsilon_decay", "must lie in (0, 1]"));
        }
        if !(0.0..=self.initial_epsilon).contains(&self.epsilon_floor) {
            return Err(invalid("epsilon_floor", "must lie in [0, initial_epsilon]"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.train_interval == 0 {
            return Err(invalid("train_interval", "must be at least 1"));
        }
        if self.detail.scene > MAX_DETAIL_LEVEL || self.detail.enemies > MAX_DETAIL_LEVEL {
            return Err(invalid(
                "detail",
                format!("zoom levels must not exceed {MAX_DETAIL_LEVEL}"),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn override_from_env<T: FromStr>(var: &'static str, slot: &mut T) {
    if let Ok(raw) = env::var(var) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!(var, value = %raw, "ignoring unparsable override"),
        }
    }
}
