//! Per-frame status of the avatar.
//!
//! A `StatusSnapshot` is captured once per frame and never mutated afterwards.
//! The agent keeps the previous frame's snapshot alongside the current one;
//! every delta (velocity direction, kills, collision, stuck counter, grounded
//! height) is derived from that explicit pair.

use serde::{Deserialize, Serialize};

use crate::learning::environment::Environment;
use crate::learning::params::STUCK_EPSILON;

/// Power-up mode of the avatar. Ordered so that a decrease means damage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Small,
    Large,
    Fire,
}

impl Mode {
    /// Maps the game's numeric mode (0 small, 1 big, 2 fire-capable).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Small),
            1 => Some(Self::Large),
            2 => Some(Self::Fire),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Small => 0,
            Self::Large => 1,
            Self::Fire => 2,
        }
    }
}

/// Life status reported by the game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvatarStatus {
    Dead,
    Win,
    #[default]
    Running,
}

impl AvatarStatus {
    /// Maps the game's numeric status (0 dead, 1 win, 2 running).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Dead),
            1 => Some(Self::Win),
            2 => Some(Self::Running),
            _ => None,
        }
    }
}

/// Floating world position; `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True if neither coordinate moved by `STUCK_EPSILON` or more.
    #[must_use]
    pub fn is_near(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < STUCK_EPSILON && (self.y - other.y).abs() < STUCK_EPSILON
    }
}

/// Cumulative kill counters by method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillCounters {
    pub stomp: u32,
    pub fire: u32,
    pub shell: u32,
    pub total: u32,
}

/// Immutable record of one frame's avatar status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub mode: Mode,
    pub position: Position,
    /// Position at the most recent frame (up to and including this one) spent on ground.
    pub grounded_position: Position,
    pub kills: KillCounters,
    pub on_ground: bool,
    pub can_jump: bool,
    pub carrying: bool,
    pub can_shoot: bool,
    pub status: AvatarStatus,
    /// Consecutive frames without movement, including this one.
    pub stuck_frames: u32,
}

impl StatusSnapshot {
    /// Queries the environment and derives the history-dependent fields from `previous`.
    #[must_use]
    pub fn capture<E: Environment + ?Sized>(env: &E, previous: Option<&Self>) -> Self {
        Self {
            mode: env.mode(),
            position: env.position(),
            grounded_position: env.position(),
            kills: env.kills(),
            on_ground: env.is_on_ground(),
            can_jump: env.can_jump(),
            carrying: env.is_carrying(),
            can_shoot: env.can_shoot(),
            status: env.status(),
            stuck_frames: 0,
        }
        .track(previous)
    }

    /// Fills `stuck_frames` and `grounded_position` from the preceding frame.
    ///
    /// All other fields are taken as observed.
    #[must_use]
    pub fn track(mut self, previous: Option<&Self>) -> Self {
        let Some(prev) = previous else {
            self.stuck_frames = 0;
            self.grounded_position = self.position;
            return self;
        };

        self.stuck_frames = if self.position.is_near(&prev.position) {
            prev.stuck_frames.saturating_add(1)
        } else {
            0
        };
        self.grounded_position = if self.on_ground {
            self.position
        } else {
            prev.grounded_position
        };
        self
    }

    /// Small avatars occupy one cell; every other mode is two cells tall.
    #[must_use]
    pub fn is_short_footprint(&self) -> bool {
        self.mode == Mode::Small
    }

    #[must_use]
    pub fn is_stuck(&self, threshold: u32) -> bool {
        self.stuck_frames > threshold
    }

    /// Mode dropped since `previous`, or the avatar died this frame.
    #[must_use]
    pub fn collided_since(&self, previous: &Self) -> bool {
        previous.mode > self.mode || self.status == AvatarStatus::Dead
    }

    /// The episode cannot continue from this frame.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status != AvatarStatus::Running
    }
}
