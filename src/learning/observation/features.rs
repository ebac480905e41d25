//! Assembly of the fixed-width feature vector.
//!
//! Layout: 15 scalar status bits (see [`ScalarFeature`]) followed by the
//! flattened direction tensor, 255 entries in total.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::learning::environment::{EgoPosition, ObservationGrid};
use crate::learning::observation::directions::{DirectionTensor, ScanPattern};
use crate::learning::params::{DEFAULT_STUCK_FRAMES, FEATURE_LEN, NUM_SCALAR_FEATURES};
use crate::learning::status::{Mode, StatusSnapshot};

/// Scalar status bits at the head of the feature vector, in index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarFeature {
    Small,
    Fire,
    MovingLeft,
    MovingRight,
    MovingUp,
    MovingDown,
    Stuck,
    OnGround,
    CanJump,
    Carrying,
    CanShoot,
    Collided,
    KilledByStomp,
    KilledByFire,
    KilledByShell,
}

impl ScalarFeature {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One frame's encoded observation. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    #[must_use]
    pub fn bit(&self, feature: ScalarFeature) -> bool {
        self.0[feature.index()] > 0.0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Deref for FeatureVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(features: FeatureVector) -> Self {
        features.0
    }
}

/// Builds feature vectors from status pairs and occupancy grids.
#[derive(Clone, Debug)]
pub struct FeatureEncoder {
    stuck_threshold: u32,
    short: ScanPattern,
    tall: ScanPattern,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_STUCK_FRAMES)
    }
}

impl FeatureEncoder {
    #[must_use]
    pub fn new(stuck_threshold: u32) -> Self {
        Self {
            stuck_threshold,
            short: ScanPattern::new(true),
            tall: ScanPattern::new(false),
        }
    }

    #[must_use]
    pub const fn stuck_threshold(&self) -> u32 {
        self.stuck_threshold
    }

    /// Scans the grid with the footprint of `current` and assembles the vector.
    #[must_use]
    pub fn encode(
        &self,
        previous: &StatusSnapshot,
        current: &StatusSnapshot,
        grid: &ObservationGrid,
        ego: EgoPosition,
    ) -> FeatureVector {
        let pattern = if current.is_short_footprint() {
            &self.short
        } else {
            &self.tall
        };
        let tensor = pattern.scan(grid, ego);
        self.assemble(previous, current, &tensor)
    }

    /// Prepends the scalar status bits for `previous -> current` to `tensor`.
    #[must_use]
    pub fn assemble(
        &self,
        previous: &StatusSnapshot,
        current: &StatusSnapshot,
        tensor: &DirectionTensor,
    ) -> FeatureVector {
        let dx = previous.position.x - current.position.x;
        let dy = previous.position.y - current.position.y;
        let bits = [
            current.mode == Mode::Small,
            current.mode == Mode::Fire,
            dx > 0.0,
            dx < 0.0,
            dy > 0.0,
            dy < 0.0,
            current.is_stuck(self.stuck_threshold),
            current.on_ground,
            current.can_jump,
            current.carrying,
            current.can_shoot,
            current.collided_since(previous),
            current.kills.stomp > previous.kills.stomp,
            current.kills.fire > previous.kills.fire,
            current.kills.shell > previous.kills.shell,
        ];
        debug_assert_eq!(bits.len(), NUM_SCALAR_FEATURES);

        let mut values = Vec::with_capacity(FEATURE_LEN);
        values.extend(bits.iter().map(|bit| f64::from(u8::from(*bit))));
        values.extend(tensor.values());
        FeatureVector(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::observation::{Direction, ElementClass, Range};
    use crate::learning::status::{KillCounters, Position};

    #[test]
    fn test_vector_width() {
        let snap = StatusSnapshot::default();
        let features = FeatureEncoder::default().assemble(&snap, &snap, &DirectionTensor::new());
        assert_eq!(features.len(), FEATURE_LEN);
        assert!(features.bit(ScalarFeature::Small));
        assert_eq!(features.iter().filter(|v| **v > 0.0).count(), 1);
    }

    #[test]
    fn test_diagonal_motion_sets_two_bits() {
        let previous = StatusSnapshot {
            position: Position::new(10.0, 10.0),
            ..StatusSnapshot::default()
        };
        let current = StatusSnapshot {
            position: Position::new(12.0, 8.0),
            ..StatusSnapshot::default()
        };
        let features =
            FeatureEncoder::default().assemble(&previous, &current, &DirectionTensor::new());
        assert!(features.bit(ScalarFeature::MovingRight));
        assert!(features.bit(ScalarFeature::MovingUp));
        assert!(!features.bit(ScalarFeature::MovingLeft));
        assert!(!features.bit(ScalarFeature::MovingDown));
    }

    #[test]
    fn test_kill_bits_follow_method() {
        let previous = StatusSnapshot::default();
        let current = StatusSnapshot {
            kills: KillCounters {
                fire: 2,
                total: 2,
                ..KillCounters::default()
            },
            ..StatusSnapshot::default()
        };
        let features =
            FeatureEncoder::default().assemble(&previous, &current, &DirectionTensor::new());
        assert!(features.bit(ScalarFeature::KilledByFire));
        assert!(!features.bit(ScalarFeature::KilledByStomp));
        assert!(!features.bit(ScalarFeature::KilledByShell));
    }

    #[test]
    fn test_tensor_follows_scalars() {
        let mut tensor = DirectionTensor::new();
        tensor.mark(ElementClass::Goomba, Range::Mid, Direction::Right);
        let snap = StatusSnapshot {
            mode: Mode::Large,
            ..StatusSnapshot::default()
        };
        let features = FeatureEncoder::default().assemble(&snap, &snap, &tensor);
        let index = NUM_SCALAR_FEATURES
            + DirectionTensor::flat_index(ElementClass::Goomba, Range::Mid, Direction::Right);
        assert!((features[index] - 1.0).abs() < f64::EPSILON);
        assert_eq!(features.iter().filter(|v| **v > 0.0).count(), 1);
    }
}
