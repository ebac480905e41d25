//! Canonical element classes for raw grid codes.

use serde::{Deserialize, Serialize};

use crate::learning::params::NUM_ELEMENTS;

/// Element classes the encoder distinguishes. Anything unlisted is `Empty`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElementClass {
    #[default]
    Empty = 0,
    /// Solid cell the avatar cannot pass through
    Solid = 1,
    BorderHill = 2,
    Brick = 3,
    /// Flower pot or cannon
    FlowerPot = 4,
    FireFlower = 5,
    Goomba = 6,
    Spiky = 7,
    Mushroom = 8,
    Fireball = 9,
}

impl ElementClass {
    #[must_use]
    pub const fn all() -> [Self; NUM_ELEMENTS] {
        [
            Self::Empty,
            Self::Solid,
            Self::BorderHill,
            Self::Brick,
            Self::FlowerPot,
            Self::FireFlower,
            Self::Goomba,
            Self::Spiky,
            Self::Mushroom,
            Self::Fireball,
        ]
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Raw code the game uses for this class (empty space is 0).
    #[must_use]
    pub const fn code(self) -> i8 {
        match self {
            Self::Empty => 0,
            Self::Solid => -60,
            Self::BorderHill => -62,
            Self::Brick => -24,
            Self::FlowerPot => -85,
            Self::FireFlower => 3,
            Self::Goomba => 80,
            Self::Spiky => 93,
            Self::Mushroom => 2,
            Self::Fireball => 25,
        }
    }
}

/// Maps a raw cell code to its element class. Total: unknown codes are `Empty`.
#[must_use]
pub const fn classify(code: i8) -> ElementClass {
    match code {
        -60 => ElementClass::Solid,
        -62 => ElementClass::BorderHill,
        -24 => ElementClass::Brick,
        -85 => ElementClass::FlowerPot,
        3 => ElementClass::FireFlower,
        80 => ElementClass::Goomba,
        93 => ElementClass::Spiky,
        2 => ElementClass::Mushroom,
        25 => ElementClass::Fireball,
        _ => ElementClass::Empty,
    }
}
