//! Compound actions and their primitive control encoding.
//!
//! The agent picks one of 12 compound actions from
//! {stay, left, right} x {jump, no jump} x {speed, no speed}. Each maps to a
//! subset of the six primitive controls. `Down` and `Up` exist in the control
//! vector but no compound action presses them.

use serde::{Deserialize, Serialize};

use crate::learning::params::{NUM_ACTIONS, NUM_CONTROLS};

/// Raw boolean inputs consumed by the game, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveControl {
    Left,
    Right,
    Down,
    Jump,
    Speed,
    Up,
}

impl PrimitiveControl {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Jump => 3,
            Self::Speed => 4,
            Self::Up => 5,
        }
    }

    #[must_use]
    pub const fn all() -> [Self; NUM_CONTROLS] {
        [
            Self::Left,
            Self::Right,
            Self::Down,
            Self::Jump,
            Self::Speed,
            Self::Up,
        ]
    }
}

/// The six-element boolean vector handed to the game each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlVector([bool; NUM_CONTROLS]);

impl ControlVector {
    #[must_use]
    pub fn from_controls(controls: &[PrimitiveControl]) -> Self {
        let mut keys = [false; NUM_CONTROLS];
        for control in controls {
            keys[control.index()] = true;
        }
        Self(keys)
    }

    #[must_use]
    pub const fn is_pressed(&self, control: PrimitiveControl) -> bool {
        self.0[control.index()]
    }

    #[must_use]
    pub const fn as_array(&self) -> [bool; NUM_CONTROLS] {
        self.0
    }

    /// Pressed controls in wire order.
    pub fn pressed(&self) -> impl Iterator<Item = PrimitiveControl> + '_ {
        PrimitiveControl::all()
            .into_iter()
            .filter(|control| self.is_pressed(*control))
    }
}

/// One of the 12 agent-level decisions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompoundAction {
    #[default]
    Stay = 0,
    Left = 1,
    Right = 2,
    Jump = 3,
    LeftJump = 4,
    RightJump = 5,
    Speed = 6,
    LeftSpeed = 7,
    RightSpeed = 8,
    JumpSpeed = 9,
    LeftJumpSpeed = 10,
    RightJumpSpeed = 11,
}

const CONTROL_TABLE: [&[PrimitiveControl]; NUM_ACTIONS] = [
    &[],
    &[PrimitiveControl::Left],
    &[PrimitiveControl::Right],
    &[PrimitiveControl::Jump],
    &[PrimitiveControl::Left, PrimitiveControl::Jump],
    &[PrimitiveControl::Right, PrimitiveControl::Jump],
    &[PrimitiveControl::Speed],
    &[PrimitiveControl::Left, PrimitiveControl::Speed],
    &[PrimitiveControl::Right, PrimitiveControl::Speed],
    &[PrimitiveControl::Jump, PrimitiveControl::Speed],
    &[PrimitiveControl::Left, PrimitiveControl::Jump, PrimitiveControl::Speed],
    &[PrimitiveControl::Right, PrimitiveControl::Jump, PrimitiveControl::Speed],
];

impl CompoundAction {
    /// All actions in id order.
    #[must_use]
    pub const fn all() -> [Self; NUM_ACTIONS] {
        [
            Self::Stay,
            Self::Left,
            Self::Right,
            Self::Jump,
            Self::LeftJump,
            Self::RightJump,
            Self::Speed,
            Self::LeftSpeed,
            Self::RightSpeed,
            Self::JumpSpeed,
            Self::LeftJumpSpeed,
            Self::RightJumpSpeed,
        ]
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    /// Primitive controls pressed by this action.
    #[must_use]
    pub const fn controls(self) -> &'static [PrimitiveControl] {
        CONTROL_TABLE[self as usize]
    }

    #[must_use]
    pub fn to_primitive(self) -> ControlVector {
        ControlVector::from_controls(self.controls())
    }
}

/// Picks the first strictly positive entry of a 12-way output.
///
/// An output with no positive entry decodes to `Stay`.
#[must_use]
pub fn decode(outputs: &[f64; NUM_ACTIONS]) -> CompoundAction {
    outputs
        .iter()
        .position(|value| *value > 0.0)
        .and_then(CompoundAction::from_index)
        .unwrap_or_default()
}
