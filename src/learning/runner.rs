//! Frame loop and training schedule for one episode.

use serde::Serialize;
use tracing::info;

use crate::learning::approximator::ActionValueModel;
use crate::learning::dqn::DqnAgent;
use crate::learning::environment::Environment;
use crate::learning::error::AgentError;
use crate::learning::status::AvatarStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpisodeConfig {
    /// Frames after which the episode is cut off.
    pub max_frames: u64,
    /// Run training steps between frames.
    pub train: bool,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_frames: 2_000,
            train: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub frames: u64,
    pub total_reward: f64,
    pub kills: u32,
    pub final_x: f64,
    pub epsilon: f64,
    pub train_steps: u64,
    pub status: AvatarStatus,
}

/// Plays `env` until the avatar dies, wins, or `max_frames` is reached.
///
/// Training runs every `train_interval` frames on a `batch_size` minibatch,
/// always between two frames.
///
/// # Errors
/// Propagates the first error raised by acting or training.
pub fn run_episode<E, M>(
    env: &mut E,
    agent: &mut DqnAgent<M>,
    config: EpisodeConfig,
) -> Result<EpisodeSummary, AgentError>
where
    E: Environment + ?Sized,
    M: ActionValueModel + Sync,
{
    agent.reset_episode();
    let interval = agent.config().train_interval;
    let batch_size = agent.config().batch_size;

    let mut frames = 0;
    let mut total_reward = 0.0;
    let mut train_steps = 0;
    loop {
        let step = if frames >= config.max_frames {
            agent.finish_episode(env)?
        } else {
            agent.act(env)?
        };
        total_reward += step.reward.unwrap_or(0.0);
        if step.terminal {
            break;
        }
        env.perform(step.controls);
        frames += 1;

        if config.train
            && frames % interval == 0
            && agent.train_minibatch(batch_size)?.is_some()
        {
            train_steps += 1;
        }
    }

    let summary = EpisodeSummary {
        frames,
        total_reward,
        kills: env.kills().total,
        final_x: env.position().x,
        epsilon: agent.epsilon(),
        train_steps,
        status: env.status(),
    };
    info!(
        frames = summary.frames,
        total_reward = summary.total_reward,
        kills = summary.kills,
        final_x = summary.final_x,
        epsilon = summary.epsilon,
        status = ?summary.status,
        "episode finished"
    );
    Ok(summary)
}
