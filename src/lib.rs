#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

//! Decision core of a deep Q-learning agent for a tile-based platform game.
//!
//! The agent observes an ego-centred occupancy grid every frame, compresses it
//! into a fixed 255-wide feature vector, shapes a bounded reward from status
//! deltas, and learns action values from an experience replay buffer.

pub mod learning;
