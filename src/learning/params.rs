//! Agent hyperparameters and encoding dimensions.

/// Number of canonical element classes (empty + 9 hazards/items).
pub const NUM_ELEMENTS: usize = 10;
/// Concentric inspection shells around the ego cell (short, mid, long).
pub const NUM_RANGES: usize = 3;
/// Compass directions scanned per range.
pub const NUM_DIRECTIONS: usize = 8;
/// Scalar status bits at the head of every feature vector.
pub const NUM_SCALAR_FEATURES: usize = 15;
/// Entries in the flattened direction tensor.
pub const TENSOR_LEN: usize = NUM_ELEMENTS * NUM_RANGES * NUM_DIRECTIONS;
/// Full feature vector width.
pub const FEATURE_LEN: usize = NUM_SCALAR_FEATURES + TENSOR_LEN;

/// Compound actions the agent chooses between.
pub const NUM_ACTIONS: usize = 12;
/// Raw boolean controls consumed by the game.
pub const NUM_CONTROLS: usize = 6;

/// Largest cell distance any window reaches from ego (upward, tall footprint).
pub const MAX_REACH: usize = 6;

/// Position delta below which the avatar counts as not moving.
pub const STUCK_EPSILON: f64 = 0.0001;
pub const DEFAULT_STUCK_FRAMES: u32 = 5;

pub const DEFAULT_GAMMA: f64 = 0.9;
pub const DEFAULT_INITIAL_EPSILON: f64 = 0.9999;
pub const DEFAULT_EPSILON_DECAY: f64 = 0.9999;
pub const DEFAULT_EPSILON_FLOOR: f64 = 0.0;
pub const DEFAULT_REPLAY_CAPACITY: usize = 10_000;
pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_TRAIN_INTERVAL: u64 = 1;

/// Highest zoom level accepted for scene and enemy detail.
pub const MAX_DETAIL_LEVEL: u8 = 2;

// Reward terms
pub const ADVANCE_REWARD: f64 = 0.5;
pub const ELEVATION_REWARD: f64 = 0.5;
pub const KILL_REWARD: f64 = 0.5;
pub const COLLISION_PENALTY: f64 = -0.5;
pub const STUCK_PENALTY: f64 = -0.5;

/// Step size of the reference linear approximator.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
/// Scale of the uniform weight initialisation of the linear approximator.
pub const INIT_WEIGHT_SCALE: f64 = 0.01;

// Scripted level
/// World units per grid cell.
pub const CELL_SIZE: f64 = 16.0;
pub const LEVEL_HEIGHT: usize = 16;
pub const DEFAULT_LEVEL_WIDTH: usize = 160;
/// Top row of the two-row ground strip.
pub const GROUND_ROW: usize = LEVEL_HEIGHT - 2;
/// Flat, enemy-free columns at both ends of a level.
pub const SAFE_COLUMNS: usize = 8;
/// Ego cell offset inside the square observation window.
pub const OBSERVATION_HALF: usize = 9;
/// Cells risen per jump before gravity takes over.
pub const JUMP_RISE: u32 = 4;
/// Enemies move one cell every this many frames.
pub const ENEMY_STEP_FRAMES: u64 = 2;
/// Frames of invulnerability after taking damage.
pub const INVULNERABLE_FRAMES: u32 = 12;
pub const GAP_CHANCE: f64 = 0.04;
pub const PIPE_CHANCE: f64 = 0.05;
pub const PLATFORM_CHANCE: f64 = 0.06;
pub const ENEMY_CHANCE: f64 = 0.06;
pub const ITEM_CHANCE: f64 = 0.02;
