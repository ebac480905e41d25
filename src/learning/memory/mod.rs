//! Experience memory for the learning agent.
//!
//! This module provides:
//! - A fixed-capacity circular replay buffer of transitions
//! - Uniform minibatch sampling over the filled region

mod replay_buffer;

pub use replay_buffer::{Minibatch, ReplayBuffer};
