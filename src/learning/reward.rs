//! Reward shaping from consecutive status snapshots.
//!
//! Moving forward, landing higher than the last grounded height, and killing
//! enemies are rewarded; moving backward, taking damage, and standing still
//! are penalised. The sum is clamped to [-1, 1].

use serde::{Deserialize, Serialize};

use crate::learning::params::{
    ADVANCE_REWARD, COLLISION_PENALTY, DEFAULT_STUCK_FRAMES, ELEVATION_REWARD, KILL_REWARD,
    STUCK_PENALTY,
};
use crate::learning::status::StatusSnapshot;

/// Individual reward terms of one transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardComponents {
    pub advancement: f64,
    pub elevation: f64,
    pub kills: f64,
    pub collision: f64,
    pub stuck: f64,
}

impl RewardComponents {
    /// Sum of all terms, clamped to [-1, 1].
    #[must_use]
    pub fn total(&self) -> f64 {
        (self.advancement + self.elevation + self.kills + self.collision + self.stuck)
            .clamp(-1.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RewardShaper {
    stuck_threshold: u32,
}

impl Default for RewardShaper {
    fn default() -> Self {
        Self::new(DEFAULT_STUCK_FRAMES)
    }
}

impl RewardShaper {
    #[must_use]
    pub const fn new(stuck_threshold: u32) -> Self {
        Self { stuck_threshold }
    }

    /// Breaks the `previous -> current` transition into its reward terms.
    ///
    /// Elevation compares against `previous.grounded_position`, i.e. the
    /// grounded height recorded before this frame's movement.
    #[must_use]
    pub fn components(&self, previous: &StatusSnapshot, current: &StatusSnapshot) -> RewardComponents {
        let advancement = if current.position.x > previous.position.x {
            ADVANCE_REWARD
        } else {
            -ADVANCE_REWARD
        };
        let elevation =
            if current.on_ground && current.position.y < previous.grounded_position.y {
                ELEVATION_REWARD
            } else {
                0.0
            };
        let kills = if current.kills.total > previous.kills.total {
            KILL_REWARD
        } else {
            0.0
        };
        let collision = if current.collided_since(previous) {
            COLLISION_PENALTY
        } else {
            0.0
        };
        let stuck = if current.is_stuck(self.stuck_threshold) {
            STUCK_PENALTY
        } else {
            0.0
        };

        RewardComponents {
            advancement,
            elevation,
            kills,
            collision,
            stuck,
        }
    }

    /// Scalar reward in [-1, 1].
    #[must_use]
    pub fn reward(&self, previous: &StatusSnapshot, current: &StatusSnapshot) -> f64 {
        self.components(previous, current).total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::status::{AvatarStatus, KillCounters, Mode, Position};

    fn at(x: f64, y: f64) -> StatusSnapshot {
        StatusSnapshot {
            position: Position::new(x, y),
            grounded_position: Position::new(x, y),
            ..StatusSnapshot::default()
        }
    }

    #[test]
    fn test_advancement_only() {
        let reward = RewardShaper::default().reward(&at(10.0, 50.0), &at(11.0, 50.0));
        assert!((reward - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_standing_still_is_negative() {
        let reward = RewardShaper::default().reward(&at(10.0, 50.0), &at(10.0, 50.0));
        assert!((reward + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_elevation_requires_ground() {
        let previous = at(10.0, 50.0);
        let mut current = at(11.0, 40.0);
        let shaper = RewardShaper::default();
        assert!(shaper.components(&previous, &current).elevation.abs() < 1e-12);

        current.on_ground = true;
        assert!((shaper.components(&previous, &current).elevation - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_total_is_clamped() {
        let previous = at(10.0, 50.0);
        let current = StatusSnapshot {
            on_ground: true,
            kills: KillCounters {
                stomp: 1,
                total: 1,
                ..KillCounters::default()
            },
            ..at(11.0, 40.0)
        };
        let components = RewardShaper::default().components(&previous, &current);
        assert!((components.advancement + components.elevation + components.kills - 1.5).abs() < 1e-12);
        assert!((components.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_worst_case_is_clamped() {
        let previous = StatusSnapshot {
            mode: Mode::Fire,
            ..at(10.0, 50.0)
        };
        let current = StatusSnapshot {
            status: AvatarStatus::Dead,
            stuck_frames: 9,
            ..at(10.0, 50.0)
        };
        let reward = RewardShaper::default().reward(&previous, &current);
        assert!((reward + 1.0).abs() < 1e-12);
    }
}
