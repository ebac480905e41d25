//! A small seeded side-scrolling level.
//!
//! Cell-based physics: the avatar moves one cell per frame (two with
//! `Speed`), rises `JUMP_RISE` cells per jump and then falls one cell per
//! frame. Goombas patrol the ground and turn at walls and ledges. Landing on
//! a goomba kills it; any other contact costs one power-up level. Falling
//! into a pit is fatal and reaching the goal column wins.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::learning::actions::{ControlVector, PrimitiveControl};
use crate::learning::environment::{DetailLevels, EgoPosition, Environment, ObservationGrid};
use crate::learning::observation::{classify, ElementClass};
use crate::learning::params::{
    CELL_SIZE, DEFAULT_LEVEL_WIDTH, ENEMY_CHANCE, ENEMY_STEP_FRAMES, GAP_CHANCE, GROUND_ROW,
    INVULNERABLE_FRAMES, ITEM_CHANCE, JUMP_RISE, LEVEL_HEIGHT, OBSERVATION_HALF, PIPE_CHANCE,
    PLATFORM_CHANCE, SAFE_COLUMNS,
};
use crate::learning::status::{AvatarStatus, KillCounters, Mode, Position};

/// Code reported for any obstacle or enemy at the coarsest zoom level.
const COARSE_CODE: i8 = 1;
/// Column the avatar spawns in.
const START_COLUMN: isize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Enemy {
    col: isize,
    row: isize,
    dir: isize,
    alive: bool,
}

const fn blocks(code: i8) -> bool {
    matches!(
        classify(code),
        ElementClass::Solid | ElementClass::BorderHill | ElementClass::Brick | ElementClass::FlowerPot
    )
}

#[derive(Clone, Debug)]
pub struct ScriptedLevel {
    width: usize,
    tiles: Vec<i8>,
    enemies: Vec<Enemy>,
    goal: isize,
    col: isize,
    row: isize,
    mode: Mode,
    kills: KillCounters,
    rise: u32,
    invulnerable: u32,
    status: AvatarStatus,
    frame: u64,
}

impl Default for ScriptedLevel {
    fn default() -> Self {
        Self::generate(DEFAULT_LEVEL_WIDTH, 0)
    }
}

impl ScriptedLevel {
    /// Flat ground from start to goal with nothing on it.
    #[must_use]
    pub fn flat(width: usize) -> Self {
        let width = width.max(2 * SAFE_COLUMNS + 1);
        let mut level = Self {
            width,
            tiles: vec![ElementClass::Empty.code(); width * LEVEL_HEIGHT],
            enemies: Vec::new(),
            goal: (width - SAFE_COLUMNS / 2) as isize,
            col: START_COLUMN,
            row: GROUND_ROW as isize - 1,
            mode: Mode::Large,
            kills: KillCounters::default(),
            rise: 0,
            invulnerable: 0,
            status: AvatarStatus::Running,
            frame: 0,
        };
        for col in 0..width {
            level.put_ground(col);
        }
        level
    }

    /// Random level of `width` columns, reproducible from `seed`.
    ///
    /// The first and last `SAFE_COLUMNS` columns are always flat and empty.
    #[must_use]
    pub fn generate(width: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut level = Self::flat(width);
        let width = level.width;
        let feature_end = width - SAFE_COLUMNS;

        let mut col = SAFE_COLUMNS;
        while col < feature_end {
            if rng.random_bool(GAP_CHANCE) {
                level.clear_ground(col);
                // Gaps are one column wide, followed by solid ground.
                col += 2;
                continue;
            }
            if rng.random_bool(PIPE_CHANCE) {
                level.put(col, GROUND_ROW - 1, ElementClass::FlowerPot.code());
                level.put(col, GROUND_ROW - 2, ElementClass::FlowerPot.code());
            } else if rng.random_bool(ITEM_CHANCE) {
                let item = if rng.random_bool(0.5) {
                    ElementClass::Mushroom
                } else {
                    ElementClass::FireFlower
                };
                level.put(col, GROUND_ROW - 1, item.code());
            } else if rng.random_bool(ENEMY_CHANCE) {
                level.place_enemy(col);
            }
            if rng.random_bool(PLATFORM_CHANCE) {
                for c in col..(col + 3).min(feature_end) {
                    level.put(c, GROUND_ROW - 4, ElementClass::Brick.code());
                }
            }
            col += 1;
        }
        level
    }

    /// Sets the avatar's power-up mode, e.g. to start an episode small.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds a goomba standing on the ground at `col`, walking left.
    pub fn place_enemy(&mut self, col: usize) {
        self.enemies.push(Enemy {
            col: col as isize,
            row: GROUND_ROW as isize - 1,
            dir: -1,
            alive: true,
        });
    }

    /// Removes the ground under `col`, leaving a pit.
    pub fn clear_ground(&mut self, col: usize) {
        self.put(col, GROUND_ROW, ElementClass::Empty.code());
        self.put(col, GROUND_ROW + 1, ElementClass::Empty.code());
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn goal_column(&self) -> usize {
        self.goal as usize
    }

    /// Avatar feet cell as (column, row).
    #[must_use]
    pub const fn avatar_cell(&self) -> (isize, isize) {
        (self.col, self.row)
    }

    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn enemies_alive(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    fn put(&mut self, col: usize, row: usize, code: i8) {
        if col < self.width && row < LEVEL_HEIGHT {
            self.tiles[row * self.width + col] = code;
        }
    }

    fn put_ground(&mut self, col: usize) {
        self.put(col, GROUND_ROW, ElementClass::Solid.code());
        self.put(col, GROUND_ROW + 1, ElementClass::Solid.code());
    }

    /// Scene code at (`col`, `row`). Left of the level is a border wall;
    /// everything else outside is empty.
    fn tile(&self, col: isize, row: isize) -> i8 {
        if col < 0 {
            return ElementClass::BorderHill.code();
        }
        if row < 0 || row >= LEVEL_HEIGHT as isize || col >= self.width as isize {
            return ElementClass::Empty.code();
        }
        self.tiles[row as usize * self.width + col as usize]
    }

    fn blocked(&self, col: isize, row: isize) -> bool {
        blocks(self.tile(col, row))
    }

    fn is_tall(&self) -> bool {
        self.mode != Mode::Small
    }

    fn head_row(&self) -> isize {
        if self.is_tall() {
            self.row - 1
        } else {
            self.row
        }
    }

    /// The avatar's footprint fits with its feet at (`col`, `row`).
    fn fits(&self, col: isize, row: isize) -> bool {
        !self.blocked(col, row) && !(self.is_tall() && self.blocked(col, row - 1))
    }

    fn grounded(&self) -> bool {
        self.blocked(self.col, self.row + 1)
    }

    fn step_enemies(&mut self) {
        if self.frame % ENEMY_STEP_FRAMES != 0 {
            return;
        }
        for i in 0..self.enemies.len() {
            let enemy = self.enemies[i];
            if !enemy.alive {
                continue;
            }
            let next = enemy.col + enemy.dir;
            if self.blocked(next, enemy.row) || !self.blocked(next, enemy.row + 1) {
                self.enemies[i].dir = -enemy.dir;
            } else {
                self.enemies[i].col = next;
            }
        }
    }

    fn collect_items(&mut self) {
        for row in [self.row, self.head_row()] {
            let code = self.tile(self.col, row);
            let upgrade = match classify(code) {
                ElementClass::Mushroom => Mode::Large,
                ElementClass::FireFlower => Mode::Fire,
                _ => continue,
            };
            self.mode = self.mode.max(upgrade);
            self.put(self.col as usize, row as usize, ElementClass::Empty.code());
        }
    }

    fn resolve_contacts(&mut self, descending: bool) {
        let head = self.head_row();
        for i in 0..self.enemies.len() {
            let enemy = self.enemies[i];
            let touching = enemy.alive && enemy.col == self.col && (head..=self.row).contains(&enemy.row);
            if !touching {
                continue;
            }
            if descending {
                self.enemies[i].alive = false;
                self.kills.stomp += 1;
                self.kills.total += 1;
                self.rise = 1;
            } else if self.invulnerable == 0 {
                self.take_damage();
            }
        }
    }

    fn take_damage(&mut self) {
        self.mode = match self.mode {
            Mode::Fire => Mode::Large,
            Mode::Large => Mode::Small,
            Mode::Small => {
                self.status = AvatarStatus::Dead;
                Mode::Small
            }
        };
        self.invulnerable = INVULNERABLE_FRAMES;
    }

    const fn zoom_scene(code: i8, level: u8) -> i8 {
        if level < 2 {
            code
        } else if blocks(code) {
            COARSE_CODE
        } else {
            ElementClass::Empty.code()
        }
    }
}

impl Environment for ScriptedLevel {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn kills(&self) -> KillCounters {
        self.kills
    }

    fn position(&self) -> Position {
        Position::new(self.col as f64 * CELL_SIZE, self.row as f64 * CELL_SIZE)
    }

    fn is_on_ground(&self) -> bool {
        self.grounded()
    }

    fn can_jump(&self) -> bool {
        self.grounded() && self.rise == 0
    }

    fn is_carrying(&self) -> bool {
        false
    }

    fn can_shoot(&self) -> bool {
        self.mode == Mode::Fire
    }

    fn status(&self) -> AvatarStatus {
        self.status
    }

    fn ego_position(&self) -> EgoPosition {
        EgoPosition::new(OBSERVATION_HALF, OBSERVATION_HALF)
    }

    /// At zoom level 2 every obstacle and every enemy collapses to one code.
    fn observation(&self, detail: DetailLevels) -> ObservationGrid {
        let size = 2 * OBSERVATION_HALF + 1;
        let half = OBSERVATION_HALF as isize;
        let mut grid = ObservationGrid::new(size, size);
        for gy in 0..size {
            for gx in 0..size {
                let code = self.tile(self.col + gx as isize - half, self.row + gy as isize - half);
                grid.set(gx, gy, Self::zoom_scene(code, detail.scene));
            }
        }

        let enemy_code = if detail.enemies < 2 {
            ElementClass::Goomba.code()
        } else {
            COARSE_CODE
        };
        for enemy in self.enemies.iter().filter(|e| e.alive) {
            let gx = enemy.col - self.col + half;
            let gy = enemy.row - self.row + half;
            if gx >= 0 && gy >= 0 {
                grid.set(gx as usize, gy as usize, enemy_code);
            }
        }
        grid
    }

    fn perform(&mut self, controls: ControlVector) {
        if self.status != AvatarStatus::Running {
            return;
        }
        self.frame += 1;
        self.invulnerable = self.invulnerable.saturating_sub(1);

        let dir = isize::from(controls.is_pressed(PrimitiveControl::Right))
            - isize::from(controls.is_pressed(PrimitiveControl::Left));
        if dir != 0 {
            let steps = if controls.is_pressed(PrimitiveControl::Speed) { 2 } else { 1 };
            for _ in 0..steps {
                if !self.fits(self.col + dir, self.row) {
                    break;
                }
                self.col += dir;
            }
        }

        let start_row = self.row;
        if self.can_jump() && controls.is_pressed(PrimitiveControl::Jump) {
            self.rise = JUMP_RISE;
        }
        if self.rise > 0 {
            if self.fits(self.col, self.row - 1) {
                self.row -= 1;
                self.rise -= 1;
            } else {
                self.rise = 0;
            }
        } else if !self.grounded() {
            self.row += 1;
        }

        self.step_enemies();
        self.collect_items();
        self.resolve_contacts(self.row > start_row);

        if self.row >= LEVEL_HEIGHT as isize - 1 {
            self.status = AvatarStatus::Dead;
        } else if self.status == AvatarStatus::Running && self.col >= self.goal {
            self.status = AvatarStatus::Win;
        }
    }
}
