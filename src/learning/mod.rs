//! Learning agent: perception, reward shaping, replay memory, and the DQN loop.

pub mod actions;
pub mod approximator;
pub mod config;
pub mod dqn;
pub mod environment;
pub mod error;
pub mod level;
pub mod memory;
pub mod observation;
pub mod params;
pub mod reward;
pub mod runner;
pub mod status;

pub use actions::{decode, CompoundAction, ControlVector, PrimitiveControl};
pub use approximator::{ActionValueModel, ActionValues, LinearModel};
pub use config::AgentConfig;
pub use dqn::{DqnAgent, Step, TrainStats};
pub use environment::{DetailLevels, EgoPosition, Environment, ObservationGrid};
pub use error::{AgentError, ConfigError, ReplayError};
pub use level::ScriptedLevel;
pub use memory::{Minibatch, ReplayBuffer};
pub use observation::{classify, DirectionTensor, ElementClass, FeatureEncoder, FeatureVector};
pub use reward::{RewardComponents, RewardShaper};
pub use runner::{run_episode, EpisodeConfig, EpisodeSummary};
pub use status::{AvatarStatus, KillCounters, Mode, Position, StatusSnapshot};
