//! Epsilon-greedy acting and TD training.
//!
//! Per frame the agent:
//! 1. captures a `StatusSnapshot` from the environment
//! 2. shapes the reward of the previous frame's action from the snapshot pair
//! 3. encodes the observation into a feature vector
//! 4. stores the finished transition (or the episode's first state)
//! 5. picks the next action and hands back its primitive controls
//!
//! The previous snapshot is replaced only after step 4, so reward and
//! velocity bits always see the pair the transition was built from.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::learning::actions::{CompoundAction, ControlVector};
use crate::learning::approximator::{argmax, max_value, ActionValueModel, ActionValues};
use crate::learning::config::AgentConfig;
use crate::learning::environment::Environment;
use crate::learning::error::AgentError;
use crate::learning::memory::ReplayBuffer;
use crate::learning::observation::FeatureEncoder;
use crate::learning::params::NUM_ACTIONS;
use crate::learning::reward::RewardShaper;
use crate::learning::status::StatusSnapshot;

/// Outcome of one training step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrainStats {
    pub samples: usize,
    /// Mean absolute difference between target and prediction at the taken action.
    pub mean_td_error: f64,
}

/// Result of one acting frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub action: CompoundAction,
    pub controls: ControlVector,
    /// Shaped reward of the transition completed this frame, if any.
    pub reward: Option<f64>,
    /// The episode ended this frame; `controls` must not be applied.
    pub terminal: bool,
}

pub struct DqnAgent<M> {
    model: M,
    config: AgentConfig,
    epsilon: f64,
    rng: ChaCha8Rng,
    replay: ReplayBuffer,
    encoder: FeatureEncoder,
    shaper: RewardShaper,
    previous: Option<StatusSnapshot>,
    pending_action: Option<CompoundAction>,
    frames: u64,
}

impl<M: ActionValueModel + Sync> DqnAgent<M> {
    /// Builds an agent around `model`.
    ///
    /// # Errors
    /// Returns `AgentError::Config` if `config` fails validation.
    pub fn new(model: M, config: AgentConfig) -> Result<Self, AgentError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        let replay = ReplayBuffer::new(config.replay_capacity, config.feature_len)?;
        Ok(Self {
            model,
            epsilon: config.initial_epsilon,
            rng,
            replay,
            encoder: FeatureEncoder::new(config.stuck_frames),
            shaper: RewardShaper::new(config.stuck_frames),
            previous: None,
            pending_action: None,
            frames: 0,
            config,
        })
    }

    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Overrides the exploration probability, clamped to [0, 1].
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub const fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }

    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Frames acted on since construction.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub const fn previous_snapshot(&self) -> Option<&StatusSnapshot> {
        self.previous.as_ref()
    }

    /// Forgets the in-flight frame pair. The next `act` starts a new episode.
    pub fn reset_episode(&mut self) {
        self.previous = None;
        self.pending_action = None;
    }

    /// Processes one frame of `env` and returns the controls to apply.
    ///
    /// # Errors
    /// Returns `AgentError::Replay` if the encoded state does not match the
    /// configured feature width.
    pub fn act<E: Environment + ?Sized>(&mut self, env: &E) -> Result<Step, AgentError> {
        self.observe(env, false)
    }

    /// Processes the last frame of a cut-off episode.
    ///
    /// The frame's transition is stored as terminal and no controls are
    /// emitted. Its target never reads the bootstrap slot, which the next
    /// episode's first state reuses.
    ///
    /// # Errors
    /// Same as [`DqnAgent::act`].
    pub fn finish_episode<E: Environment + ?Sized>(
        &mut self,
        env: &E,
    ) -> Result<Step, AgentError> {
        self.observe(env, true)
    }

    fn observe<E: Environment + ?Sized>(
        &mut self,
        env: &E,
        cut_off: bool,
    ) -> Result<Step, AgentError> {
        self.frames += 1;
        let current = StatusSnapshot::capture(env, self.previous.as_ref());
        let grid = env.observation(self.config.detail);
        let previous = self.previous.unwrap_or(current);
        let features = self
            .encoder
            .encode(&previous, &current, &grid, env.ego_position());

        let terminal = cut_off || current.is_terminal();
        let reward = match (self.previous.as_ref(), self.pending_action) {
            (Some(prev), Some(action)) => {
                let reward = self.shaper.reward(prev, &current);
                self.replay.insert(reward, action, &features, terminal)?;
                Some(reward)
            }
            _ => {
                self.replay.set_initial_state(&features)?;
                None
            }
        };

        if terminal {
            self.reset_episode();
            return Ok(Step {
                action: CompoundAction::Stay,
                controls: ControlVector::default(),
                reward,
                terminal,
            });
        }

        let action = self.select_action(&features);
        self.previous = Some(current);
        self.pending_action = Some(action);
        Ok(Step {
            action,
            controls: action.to_primitive(),
            reward,
            terminal,
        })
    }

    /// Epsilon-greedy choice. Epsilon decays only after an exploratory pick.
    pub fn select_action(&mut self, state: &[f64]) -> CompoundAction {
        if self.rng.random::<f64>() < self.epsilon {
            let index = self.rng.random_range(0..NUM_ACTIONS);
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_floor);
            trace!(action = index, epsilon = self.epsilon, "exploring");
            return CompoundAction::from_index(index).unwrap_or_default();
        }
        self.greedy_action(state)
    }

    /// Action with the highest predicted value; ties go to the lowest id.
    #[must_use]
    pub fn greedy_action(&self, state: &[f64]) -> CompoundAction {
        CompoundAction::from_index(argmax(&self.model.predict(state))).unwrap_or_default()
    }

    /// Trains on the stored transitions at `indices`, in that order.
    ///
    /// Targets for the whole batch are computed before the first update.
    ///
    /// # Errors
    /// Returns `AgentError::Replay` if an index lies outside the stored region.
    pub fn train_step(&mut self, indices: &[usize]) -> Result<TrainStats, AgentError> {
        let batch = self.replay.batch_get(indices)?;
        if batch.is_empty() {
            return Ok(TrainStats::default());
        }

        let gamma = self.config.gamma;
        let model = &self.model;
        let targets: Vec<(ActionValues, f64)> = (0..batch.len())
            .into_par_iter()
            .map(|i| {
                let mut target = model.predict(&batch.states[i]);
                let taken = batch.actions[i].index();
                let value = if batch.terminals[i] {
                    batch.rewards[i]
                } else {
                    batch.rewards[i] + gamma * max_value(&model.predict(&batch.next_states[i]))
                };
                let error = (value - target[taken]).abs();
                target[taken] = value;
                (target, error)
            })
            .collect();

        let mut error_sum = 0.0;
        for (state, (target, error)) in batch.states.iter().zip(&targets) {
            self.model.update(state, target);
            error_sum += error;
        }

        let stats = TrainStats {
            samples: batch.len(),
            mean_td_error: error_sum / batch.len() as f64,
        };
        debug!(
            samples = stats.samples,
            mean_td_error = stats.mean_td_error,
            "training step"
        );
        Ok(stats)
    }

    /// Samples `batch_size` indices and trains on them.
    ///
    /// Returns `Ok(None)` without training while the buffer is empty.
    ///
    /// # Errors
    /// Propagates replay errors from sampling or gathering.
    pub fn train_minibatch(&mut self, batch_size: usize) -> Result<Option<TrainStats>, AgentError> {
        if self.replay.is_empty() {
            warn!("training requested before any transition was stored");
            return Ok(None);
        }
        let indices = self.replay.sample_indices(batch_size, &mut self.rng)?;
        self.train_step(&indices).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::params::FEATURE_LEN;

    /// Predicts a fixed vector regardless of input; counts updates.
    struct Fixed {
        values: ActionValues,
        updates: usize,
    }

    impl ActionValueModel for Fixed {
        fn predict(&self, _state: &[f64]) -> ActionValues {
            self.values
        }

        fn update(&mut self, _state: &[f64], _target: &ActionValues) {
            self.updates += 1;
        }
    }

    fn agent(values: ActionValues, epsilon: f64) -> DqnAgent<Fixed> {
        let config = AgentConfig {
            initial_epsilon: epsilon,
            seed: Some(3),
            replay_capacity: 8,
            ..AgentConfig::default()
        };
        DqnAgent::new(Fixed { values, updates: 0 }, config).unwrap()
    }

    #[test]
    fn test_greedy_when_epsilon_zero() {
        let mut values = [0.0; NUM_ACTIONS];
        values[8] = 1.5;
        let mut agent = agent(values, 0.0);
        let state = vec![0.0; FEATURE_LEN];
        for _ in 0..20 {
            assert_eq!(agent.select_action(&state), CompoundAction::RightSpeed);
        }
        assert!(agent.epsilon().abs() < f64::EPSILON);
    }

    #[test]
    fn test_exploration_decays_epsilon() {
        let mut agent = agent([0.0; NUM_ACTIONS], 1.0);
        let state = vec![0.0; FEATURE_LEN];
        agent.select_action(&state);
        assert!((agent.epsilon() - 0.9999).abs() < 1e-12);
    }

    #[test]
    fn test_train_minibatch_on_empty_buffer() {
        let mut agent = agent([0.0; NUM_ACTIONS], 0.0);
        assert_eq!(agent.train_minibatch(4).unwrap(), None);
        assert_eq!(agent.model().updates, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AgentConfig {
            gamma: 1.5,
            ..AgentConfig::default()
        };
        assert!(matches!(
            DqnAgent::new(Fixed { values: [0.0; NUM_ACTIONS], updates: 0 }, config),
            Err(AgentError::Config(_))
        ));
    }
}
