//! Directional presence scans around the ego cell.
//!
//! Three concentric shells (short, mid, long) are each split into eight
//! compass windows. A tensor entry is set when an element class occurs
//! anywhere inside the corresponding window. Windows above the avatar are
//! lifted by one row when it stands two cells tall.
//!
//! Window shapes, with `near` the first row/column of the shell:
//! - cardinal: `depth` rows deep, `2*half+1` cells wide (sideways bands also
//!   cover the extra head row of a tall avatar)
//! - diagonal: a `depth` x `depth` block; the long shell adds a one-cell
//!   L-shaped border on its inner edge

use std::array;

use serde::{Deserialize, Serialize};

use crate::learning::environment::{EgoPosition, ObservationGrid};
use crate::learning::observation::element::{classify, ElementClass};
use crate::learning::params::{NUM_DIRECTIONS, NUM_ELEMENTS, NUM_RANGES};

/// Inspection shell around ego.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Range {
    Short,
    Mid,
    Long,
}

struct Shell {
    near: isize,
    depth: isize,
    half: isize,
    l_border: bool,
}

impl Range {
    #[must_use]
    pub const fn all() -> [Self; NUM_RANGES] {
        [Self::Short, Self::Mid, Self::Long]
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Short => 0,
            Self::Mid => 1,
            Self::Long => 2,
        }
    }

    const fn shell(self) -> Shell {
        match self {
            Self::Short => Shell {
                near: 1,
                depth: 1,
                half: 0,
                l_border: false,
            },
            Self::Mid => Shell {
                near: 2,
                depth: 2,
                half: 1,
                l_border: false,
            },
            Self::Long => Shell {
                near: 4,
                depth: 2,
                half: 2,
                l_border: true,
            },
        }
    }
}

/// Compass direction on screen (`Up` is toward smaller row indices).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    DownLeft,
    DownRight,
    UpLeft,
    UpRight,
}

impl Direction {
    #[must_use]
    pub const fn all() -> [Self; NUM_DIRECTIONS] {
        [
            Self::Up,
            Self::Down,
            Self::Left,
            Self::Right,
            Self::DownLeft,
            Self::DownRight,
            Self::UpLeft,
            Self::UpRight,
        ]
    }

    /// Tensor slot of this direction within `range`.
    ///
    /// The short shell stores `Down` in slot 0 and `Up` in slot 1; mid and
    /// long store them the other way round. The feature layout of stored
    /// transitions and trained weights follows this table.
    #[must_use]
    pub const fn slot(self, range: Range) -> usize {
        match (self, range) {
            (Self::Up, Range::Short) | (Self::Down, Range::Mid | Range::Long) => 1,
            (Self::Down, Range::Short) | (Self::Up, Range::Mid | Range::Long) => 0,
            (Self::Left, _) => 2,
            (Self::Right, _) => 3,
            (Self::DownLeft, _) => 4,
            (Self::DownRight, _) => 5,
            (Self::UpLeft, _) => 6,
            (Self::UpRight, _) => 7,
        }
    }

    const fn diagonal_signs(self) -> Option<(isize, isize)> {
        match self {
            Self::DownLeft => Some((-1, 1)),
            Self::DownRight => Some((1, 1)),
            Self::UpLeft => Some((-1, -1)),
            Self::UpRight => Some((1, -1)),
            _ => None,
        }
    }
}

/// Cell offsets `(dx, dy)` from ego scanned for `direction` in `range`.
#[must_use]
pub fn window(range: Range, direction: Direction, short_footprint: bool) -> Vec<(isize, isize)> {
    let lift = isize::from(!short_footprint);
    let Shell {
        near,
        depth,
        half,
        l_border,
    } = range.shell();
    let mut cells = Vec::new();

    if let Some((sx, sy)) = direction.diagonal_signs() {
        let place = |ax: isize, ay: isize| {
            let dy = if sy < 0 { -ay - lift } else { ay };
            (sx * ax, dy)
        };
        for i in 0..depth {
            for j in 0..depth {
                cells.push(place(near + i, near + j));
            }
        }
        if l_border {
            for i in 0..depth {
                cells.push(place(near + i, near - 1));
                cells.push(place(near - 1, near + i));
            }
        }
        return cells;
    }

    for j in 0..depth {
        match direction {
            Direction::Up => cells.extend((-half..=half).map(|i| (i, -(near + j) - lift))),
            Direction::Down => cells.extend((-half..=half).map(|i| (i, near + j))),
            Direction::Left => cells.extend((-half..=half + lift).map(|i| (-(near + j), -i))),
            Direction::Right => cells.extend((-half..=half + lift).map(|i| (near + j, -i))),
            _ => {}
        }
    }
    cells
}

/// Presence of each element class per range and direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectionTensor {
    cells: [[[bool; NUM_DIRECTIONS]; NUM_RANGES]; NUM_ELEMENTS],
}

impl Default for DirectionTensor {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectionTensor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[[false; NUM_DIRECTIONS]; NUM_RANGES]; NUM_ELEMENTS],
        }
    }

    pub fn mark(&mut self, class: ElementClass, range: Range, direction: Direction) {
        self.cells[class.index()][range.index()][direction.slot(range)] = true;
    }

    #[must_use]
    pub const fn contains(&self, class: ElementClass, range: Range, direction: Direction) -> bool {
        self.cells[class.index()][range.index()][direction.slot(range)]
    }

    /// Position of an entry in the flattened tensor: class-major, then range, then slot.
    #[must_use]
    pub const fn flat_index(class: ElementClass, range: Range, direction: Direction) -> usize {
        (class.index() * NUM_RANGES + range.index()) * NUM_DIRECTIONS + direction.slot(range)
    }

    /// Entries as 0/1 in flattened order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .map(|present| f64::from(u8::from(*present)))
    }

    /// Number of set entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.cells.iter().flatten().flatten().filter(|p| **p).count()
    }
}

/// Every window for one footprint, built once.
#[derive(Clone, Debug)]
pub(crate) struct ScanPattern {
    windows: [[Vec<(isize, isize)>; NUM_DIRECTIONS]; NUM_RANGES],
}

impl ScanPattern {
    pub(crate) fn new(short_footprint: bool) -> Self {
        let ranges = Range::all();
        let directions = Direction::all();
        Self {
            windows: array::from_fn(|r| {
                array::from_fn(|d| window(ranges[r], directions[d], short_footprint))
            }),
        }
    }

    pub(crate) fn scan(&self, grid: &ObservationGrid, ego: EgoPosition) -> DirectionTensor {
        let mut tensor = DirectionTensor::new();
        for range in Range::all() {
            for (d, direction) in Direction::all().into_iter().enumerate() {
                for &(dx, dy) in &self.windows[range.index()][d] {
                    let class = classify(grid.at_offset(ego, dx, dy));
                    if class != ElementClass::Empty {
                        tensor.mark(class, range, direction);
                    }
                }
            }
        }
        tensor
    }
}

/// Scans `grid` around `ego` into a direction tensor.
///
/// The grid must extend `MAX_REACH` cells past ego on every side.
#[must_use]
pub fn encode(grid: &ObservationGrid, ego: EgoPosition, short_footprint: bool) -> DirectionTensor {
    ScanPattern::new(short_footprint).scan(grid, ego)
}
