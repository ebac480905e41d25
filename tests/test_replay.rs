//! Tests for the experience replay buffer.

use platformer_dqn::learning::{CompoundAction, ReplayBuffer, ReplayError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn state(tag: f64) -> Vec<f64> {
    vec![tag, tag * 10.0, -tag]
}

// ============== Fill Region Tests ==============

#[test]
fn test_sampling_before_insert_fails() {
    let buf = ReplayBuffer::new(4, 3).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(buf.sample_indices(8, &mut rng), Err(ReplayError::Empty));
}

#[test]
fn test_partial_fill_samples_only_written_indices() {
    let capacity = 6;
    let mut buf = ReplayBuffer::new(capacity, 3).unwrap();
    buf.set_initial_state(&state(0.0)).unwrap();
    for i in 1..capacity {
        buf.insert(0.0, CompoundAction::Right, &state(i as f64), false)
            .unwrap();
    }

    assert!(!buf.is_full());
    assert_eq!(buf.len(), capacity - 1);

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let indices = buf.sample_indices(500, &mut rng).unwrap();
    assert_eq!(indices.len(), 500);
    assert!(indices.iter().all(|i| *i < capacity - 1));
}

#[test]
fn test_sampling_is_with_replacement() {
    let mut buf = ReplayBuffer::new(4, 3).unwrap();
    buf.insert(0.0, CompoundAction::Stay, &state(1.0), false)
        .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let indices = buf.sample_indices(10, &mut rng).unwrap();
    assert_eq!(indices, vec![0; 10]);
}

#[test]
fn test_sampling_is_seeded() {
    let mut buf = ReplayBuffer::new(16, 3).unwrap();
    for i in 0..16 {
        buf.insert(0.0, CompoundAction::Stay, &state(f64::from(i)), false)
            .unwrap();
    }
    let a = buf
        .sample_indices(32, &mut ChaCha8Rng::seed_from_u64(9))
        .unwrap();
    let b = buf
        .sample_indices(32, &mut ChaCha8Rng::seed_from_u64(9))
        .unwrap();
    assert_eq!(a, b);
}

// ============== Wraparound Tests ==============

#[test]
fn test_one_wrap_keeps_next_state_alignment() {
    let capacity = 4;
    let mut buf = ReplayBuffer::new(capacity, 3).unwrap();
    buf.set_initial_state(&state(0.0)).unwrap();
    for i in 1..=capacity + 1 {
        buf.insert(0.0, CompoundAction::Right, &state(i as f64), false)
            .unwrap();
    }

    assert!(buf.is_full());
    assert_eq!(buf.len(), capacity);
    for i in 0..capacity {
        assert_eq!(buf.next_state(i), buf.state(i + 1), "index {i}");
    }
    // Newest transition starts from the state that preceded it.
    assert_eq!(buf.state(0).unwrap(), state(4.0).as_slice());
    assert_eq!(buf.next_state(0).unwrap(), state(5.0).as_slice());
    // Wraparound boundary: the last transition still bootstraps from the extra slot.
    assert_eq!(
        buf.next_state(capacity - 1).unwrap(),
        state(4.0).as_slice()
    );
}

#[test]
fn test_capacity_one_buffer() {
    let mut buf = ReplayBuffer::new(1, 3).unwrap();
    buf.set_initial_state(&state(0.0)).unwrap();
    buf.insert(0.5, CompoundAction::Jump, &state(1.0), false)
        .unwrap();
    assert!(buf.is_full());
    assert_eq!(buf.cursor(), 0);

    buf.insert(-0.5, CompoundAction::Left, &state(2.0), true)
        .unwrap();
    let batch = buf.batch_get(&[0]).unwrap();
    assert_eq!(batch.states[0], state(1.0));
    assert_eq!(batch.next_states[0], state(2.0));
    assert_eq!(batch.actions[0], CompoundAction::Left);
    assert!(batch.terminals[0]);
}

#[test]
fn test_initial_state_after_wrap_replaces_carry() {
    let mut buf = ReplayBuffer::new(2, 3).unwrap();
    buf.set_initial_state(&state(0.0)).unwrap();
    buf.insert(0.0, CompoundAction::Right, &state(1.0), false)
        .unwrap();
    buf.insert(-1.0, CompoundAction::Right, &state(2.0), true)
        .unwrap();

    // New episode begins right at the wrap.
    buf.set_initial_state(&state(7.0)).unwrap();
    buf.insert(0.5, CompoundAction::Right, &state(8.0), false)
        .unwrap();
    assert_eq!(buf.state(0).unwrap(), state(7.0).as_slice());
    assert_eq!(buf.next_state(0).unwrap(), state(8.0).as_slice());
}

// ============== Batch Tests ==============

#[test]
fn test_end_to_end_five_inserts_into_four_slots() {
    let mut buf = ReplayBuffer::new(4, 3).unwrap();
    let log = [
        (0.1, CompoundAction::Right, false),
        (0.2, CompoundAction::RightJump, false),
        (-0.3, CompoundAction::Left, false),
        (0.4, CompoundAction::JumpSpeed, false),
        (-1.0, CompoundAction::RightSpeed, true),
    ];

    buf.set_initial_state(&state(0.0)).unwrap();
    for (i, (reward, action, terminal)) in log.iter().enumerate() {
        buf.insert(*reward, *action, &state((i + 1) as f64), *terminal)
            .unwrap();
    }

    assert_eq!(buf.cursor(), 1);
    assert!(buf.is_full());

    let batch = buf.batch_get(&[0, 1, 2, 3]).unwrap();
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.indices, vec![0, 1, 2, 3]);
    assert_eq!(batch.rewards, vec![-1.0, 0.2, -0.3, 0.4]);
    assert_eq!(
        batch.actions,
        vec![
            CompoundAction::RightSpeed,
            CompoundAction::RightJump,
            CompoundAction::Left,
            CompoundAction::JumpSpeed,
        ]
    );
    assert_eq!(batch.terminals, vec![true, false, false, false]);
    assert_eq!(
        batch.next_states,
        vec![state(5.0), state(2.0), state(3.0), state(4.0)]
    );
    assert_eq!(batch.states[0], state(4.0));
    assert_eq!(batch.states[2], state(2.0));
    assert_eq!(batch.states[3], state(3.0));
}

#[test]
fn test_batch_follows_index_order() {
    let mut buf = ReplayBuffer::new(8, 3).unwrap();
    for i in 0..5 {
        buf.insert(f64::from(i), CompoundAction::Stay, &state(f64::from(i)), false)
            .unwrap();
    }
    let batch = buf.batch_get(&[3, 0, 3]).unwrap();
    assert_eq!(batch.rewards, vec![3.0, 0.0, 3.0]);
}

#[test]
fn test_batch_rejects_out_of_range() {
    let mut buf = ReplayBuffer::new(8, 3).unwrap();
    buf.insert(0.0, CompoundAction::Stay, &state(1.0), false)
        .unwrap();
    buf.insert(0.0, CompoundAction::Stay, &state(2.0), false)
        .unwrap();
    assert_eq!(
        buf.batch_get(&[0, 5]),
        Err(ReplayError::IndexOutOfRange { index: 5, len: 2 })
    );
}

#[test]
fn test_wrong_state_width_rejected() {
    let mut buf = ReplayBuffer::new(4, 3).unwrap();
    assert_eq!(
        buf.set_initial_state(&[1.0, 2.0]),
        Err(ReplayError::StateLength {
            expected: 3,
            actual: 2
        })
    );
    assert!(buf.is_empty());
}
