//! Tests for element classification, direction scans, and feature assembly.

use platformer_dqn::learning::observation::{encode, Direction, Range, ScalarFeature};
use platformer_dqn::learning::params::{FEATURE_LEN, NUM_SCALAR_FEATURES, TENSOR_LEN};
use platformer_dqn::learning::{
    classify, DirectionTensor, EgoPosition, ElementClass, FeatureEncoder, KillCounters, Mode,
    ObservationGrid, Position, StatusSnapshot,
};

const SIZE: usize = 15;
const EGO: EgoPosition = EgoPosition::new(7, 7);

fn grid_with(cells: &[(isize, isize, ElementClass)]) -> ObservationGrid {
    let mut grid = ObservationGrid::new(SIZE, SIZE);
    for &(dx, dy, class) in cells {
        grid.set(
            EGO.x.wrapping_add_signed(dx),
            EGO.y.wrapping_add_signed(dy),
            class.code(),
        );
    }
    grid
}

// ============== Classifier Tests ==============

#[test]
fn test_classify_is_total_and_stable() {
    for code in i8::MIN..=i8::MAX {
        let class = classify(code);
        assert!(class.index() < ElementClass::all().len());
        assert_eq!(classify(code), class);
    }
}

#[test]
fn test_named_codes_round_trip() {
    for class in ElementClass::all() {
        assert_eq!(classify(class.code()), class);
    }
    assert_eq!(classify(1), ElementClass::Empty);
    assert_eq!(classify(-1), ElementClass::Empty);
}

// ============== Direction Scan Tests ==============

#[test]
fn test_empty_grid_yields_zero_tensor() {
    let grid = ObservationGrid::new(SIZE, SIZE);
    for short in [true, false] {
        let tensor = encode(&grid, EGO, short);
        assert_eq!(tensor.values().count(), TENSOR_LEN);
        assert_eq!(tensor.count(), 0);
    }
}

#[test]
fn test_adjacent_enemy_is_short_range() {
    let grid = grid_with(&[(1, 0, ElementClass::Goomba)]);
    let tensor = encode(&grid, EGO, true);
    assert!(tensor.contains(ElementClass::Goomba, Range::Short, Direction::Right));
    assert_eq!(tensor.count(), 1);
}

#[test]
fn test_cells_in_same_window_accumulate() {
    let grid = grid_with(&[
        (2, 0, ElementClass::Goomba),
        (3, 0, ElementClass::Goomba),
        (2, 1, ElementClass::Goomba),
    ]);
    let tensor = encode(&grid, EGO, true);
    assert!(tensor.contains(ElementClass::Goomba, Range::Mid, Direction::Right));
    assert_eq!(tensor.count(), 1);
}

#[test]
fn test_ranges_do_not_overlap() {
    let grid = grid_with(&[
        (0, 1, ElementClass::Solid),
        (0, 2, ElementClass::Solid),
        (0, 4, ElementClass::Solid),
    ]);
    let tensor = encode(&grid, EGO, true);
    for range in Range::all() {
        assert!(tensor.contains(ElementClass::Solid, range, Direction::Down));
    }
    assert_eq!(tensor.count(), 3);
}

#[test]
fn test_tall_footprint_lifts_upward_windows() {
    // Head height of a tall avatar.
    let grid = grid_with(&[(0, -1, ElementClass::Brick), (0, -2, ElementClass::Spiky)]);

    let short = encode(&grid, EGO, true);
    assert!(short.contains(ElementClass::Brick, Range::Short, Direction::Up));
    assert!(short.contains(ElementClass::Spiky, Range::Mid, Direction::Up));

    let tall = encode(&grid, EGO, false);
    assert!(!tall.contains(ElementClass::Brick, Range::Short, Direction::Up));
    assert!(tall.contains(ElementClass::Spiky, Range::Short, Direction::Up));
    // The head cell itself lies in no window.
    assert_eq!(tall.count(), 1);
}

#[test]
fn test_tall_sideways_band_covers_head_row() {
    let grid = grid_with(&[(-1, -1, ElementClass::Fireball)]);
    let short = encode(&grid, EGO, true);
    assert!(short.contains(ElementClass::Fireball, Range::Short, Direction::UpLeft));

    let tall = encode(&grid, EGO, false);
    assert!(tall.contains(ElementClass::Fireball, Range::Short, Direction::Left));
    assert!(!tall.contains(ElementClass::Fireball, Range::Short, Direction::UpLeft));
}

#[test]
fn test_long_diagonal_border() {
    let grid = grid_with(&[(3, 4, ElementClass::Mushroom)]);
    let tensor = encode(&grid, EGO, true);
    assert!(tensor.contains(ElementClass::Mushroom, Range::Long, Direction::DownRight));
    assert_eq!(tensor.count(), 1);
}

// ============== Assembly Tests ==============

#[test]
fn test_encoded_vector_layout() {
    let grid = grid_with(&[(1, 0, ElementClass::Goomba)]);
    let previous = StatusSnapshot {
        mode: Mode::Fire,
        position: Position::new(20.0, 10.0),
        ..StatusSnapshot::default()
    };
    let current = StatusSnapshot {
        mode: Mode::Large,
        position: Position::new(10.0, 10.0),
        on_ground: true,
        kills: KillCounters {
            shell: 1,
            total: 1,
            ..KillCounters::default()
        },
        ..StatusSnapshot::default()
    };

    let features = FeatureEncoder::default().encode(&previous, &current, &grid, EGO);
    assert_eq!(features.len(), FEATURE_LEN);

    let set: Vec<usize> = (0..NUM_SCALAR_FEATURES)
        .filter(|i| features[*i] > 0.0)
        .collect();
    assert_eq!(
        set,
        vec![
            ScalarFeature::MovingLeft.index(),
            ScalarFeature::OnGround.index(),
            ScalarFeature::Collided.index(),
            ScalarFeature::KilledByShell.index(),
        ]
    );

    // Large avatars scan with the tall footprint, which still sees the cell to the right.
    let index = NUM_SCALAR_FEATURES
        + DirectionTensor::flat_index(ElementClass::Goomba, Range::Short, Direction::Right);
    assert!((features[index] - 1.0).abs() < f64::EPSILON);
    assert!(features.iter().all(|v| *v == 0.0 || *v == 1.0));
}

#[test]
fn test_stuck_bit_needs_more_than_threshold() {
    let encoder = FeatureEncoder::new(5);
    let tensor = DirectionTensor::new();
    let previous = StatusSnapshot::default();
    let mut current = StatusSnapshot {
        stuck_frames: 5,
        ..StatusSnapshot::default()
    };
    assert!(!encoder
        .assemble(&previous, &current, &tensor)
        .bit(ScalarFeature::Stuck));

    current.stuck_frames = 6;
    assert!(encoder
        .assemble(&previous, &current, &tensor)
        .bit(ScalarFeature::Stuck));
}
