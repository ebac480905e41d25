//! Interface to the game engine.
//!
//! The engine is an external collaborator: it answers per-frame status
//! queries, supplies an ego-centred occupancy grid, and consumes one
//! primitive control vector per frame.

use serde::{Deserialize, Serialize};

use crate::learning::actions::ControlVector;
use crate::learning::status::{AvatarStatus, KillCounters, Mode, Position};

/// Zoom levels for the merged scene/enemy observation (0 finest, 2 coarsest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailLevels {
    pub scene: u8,
    pub enemies: u8,
}

impl Default for DetailLevels {
    fn default() -> Self {
        Self {
            scene: 1,
            enemies: 1,
        }
    }
}

/// Cell coordinates of the avatar inside the observation grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgoPosition {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
}

impl EgoPosition {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Row-major grid of raw cell codes around the avatar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservationGrid {
    width: usize,
    height: usize,
    cells: Vec<i8>,
}

impl ObservationGrid {
    /// Creates a grid with every cell set to the empty code (0).
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    #[must_use]
    pub fn filled(width: usize, height: usize, code: i8) -> Self {
        Self {
            width,
            height,
            cells: vec![code; width * height],
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the code at (`x`, `y`), or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<i8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Writes `code` at (`x`, `y`). Writes outside the grid are ignored.
    pub fn set(&mut self, x: usize, y: usize, code: i8) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = code;
        }
    }

    /// Reads the cell displaced by (`dx`, `dy`) from `ego`.
    ///
    /// # Panics
    /// Panics if the offset leaves the grid. The engine guarantees enough
    /// padding around ego; a miss is a broken contract, not a runtime case.
    #[must_use]
    pub fn at_offset(&self, ego: EgoPosition, dx: isize, dy: isize) -> i8 {
        let x = ego.x.wrapping_add_signed(dx);
        let y = ego.y.wrapping_add_signed(dy);
        debug_assert!(
            x < self.width && y < self.height,
            "offset ({dx}, {dy}) from {ego:?} leaves {}x{} grid",
            self.width,
            self.height
        );
        self.cells[y * self.width + x]
    }

    /// True if every cell within `reach` of `ego` lies inside the grid.
    #[must_use]
    pub fn covers(&self, ego: EgoPosition, reach: usize) -> bool {
        ego.x >= reach
            && ego.y >= reach
            && ego.x + reach < self.width
            && ego.y + reach < self.height
    }
}

/// The game engine as seen by the agent.
pub trait Environment {
    fn mode(&self) -> Mode;
    fn kills(&self) -> KillCounters;
    fn position(&self) -> Position;
    fn is_on_ground(&self) -> bool;
    fn can_jump(&self) -> bool;
    fn is_carrying(&self) -> bool;
    fn can_shoot(&self) -> bool;
    fn status(&self) -> AvatarStatus;
    fn ego_position(&self) -> EgoPosition;
    /// Merged scene/enemy grid, padded at least `MAX_REACH` cells around ego.
    fn observation(&self, detail: DetailLevels) -> ObservationGrid;
    /// Applies one frame of primitive controls and advances the game.
    fn perform(&mut self, controls: ControlVector);
}
