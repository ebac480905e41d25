//! Fixed-capacity circular store of transitions.

use rand::Rng;

use crate::learning::actions::CompoundAction;
use crate::learning::error::ReplayError;

/// A fixed-capacity circular buffer of `(s, a, r, s', terminal)` transitions.
///
/// States live in `capacity + 1` slots so that transition `i` reads its state
/// from slot `i` and its next state from slot `i + 1`; consecutive
/// transitions share a slot. Once the buffer is full, the slot at the cursor
/// holds both the newest next-state and the state of the oldest transition.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    capacity: usize,
    state_len: usize,
    cursor: usize,
    full: bool,
    /// Cursor wrapped; slot 0 must take the last slot's state before the next insert.
    wrap_pending: bool,
    states: Vec<f64>,
    rewards: Vec<f64>,
    actions: Vec<CompoundAction>,
    terminals: Vec<bool>,
}

/// Column-wise view of sampled transitions, aligned to the sampled index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Minibatch {
    pub indices: Vec<usize>,
    pub states: Vec<Vec<f64>>,
    pub actions: Vec<CompoundAction>,
    pub rewards: Vec<f64>,
    pub next_states: Vec<Vec<f64>>,
    pub terminals: Vec<bool>,
}

impl Minibatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl ReplayBuffer {
    /// Creates an empty buffer for `capacity` transitions of `state_len`-wide states.
    ///
    /// # Errors
    /// Returns `ReplayError::ZeroCapacity` if `capacity` is 0.
    pub fn new(capacity: usize, state_len: usize) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            state_len,
            cursor: 0,
            full: false,
            wrap_pending: false,
            states: vec![0.0; (capacity + 1) * state_len],
            rewards: vec![0.0; capacity],
            actions: vec![CompoundAction::default(); capacity],
            terminals: vec![false; capacity],
        })
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn state_len(&self) -> usize {
        self.state_len
    }

    /// Slot the next transition is written to.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once the cursor has wrapped at least once.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.full
    }

    /// Number of sampleable transitions.
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.full {
            self.capacity
        } else {
            self.cursor
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records the first state of an episode in the cursor slot.
    ///
    /// # Errors
    /// Returns `ReplayError::StateLength` if `state` has the wrong width.
    pub fn set_initial_state(&mut self, state: &[f64]) -> Result<(), ReplayError> {
        self.check_len(state)?;
        self.write_slot(self.cursor, state);
        self.wrap_pending = false;
        Ok(())
    }

    /// Stores the transition leaving the cursor slot's state.
    ///
    /// # Errors
    /// Returns `ReplayError::StateLength` if `next_state` has the wrong width.
    pub fn insert(
        &mut self,
        reward: f64,
        action: CompoundAction,
        next_state: &[f64],
        terminal: bool,
    ) -> Result<(), ReplayError> {
        self.check_len(next_state)?;
        if self.wrap_pending {
            let last = self.slot_range(self.capacity);
            self.states.copy_within(last, 0);
            self.wrap_pending = false;
        }

        self.write_slot(self.cursor + 1, next_state);
        self.rewards[self.cursor] = reward;
        self.actions[self.cursor] = action;
        self.terminals[self.cursor] = terminal;

        self.cursor += 1;
        if self.cursor >= self.capacity {
            self.cursor = 0;
            self.full = true;
            self.wrap_pending = true;
        }
        Ok(())
    }

    /// Draws `count` indices uniformly, with replacement, from the filled region.
    ///
    /// # Errors
    /// Returns `ReplayError::Empty` if no transition has been stored yet.
    pub fn sample_indices<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, ReplayError> {
        let upper = self.len();
        if upper == 0 {
            return Err(ReplayError::Empty);
        }
        Ok((0..count).map(|_| rng.random_range(0..upper)).collect())
    }

    /// State slot `slot` (0..=capacity).
    #[must_use]
    pub fn state(&self, slot: usize) -> Option<&[f64]> {
        (slot <= self.capacity).then(|| &self.states[self.slot_range(slot)])
    }

    /// Bootstrap state of transition `index`; always `state(index + 1)`.
    #[must_use]
    pub fn next_state(&self, index: usize) -> Option<&[f64]> {
        if index >= self.capacity {
            return None;
        }
        self.state(index + 1)
    }

    #[must_use]
    pub fn reward(&self, index: usize) -> Option<f64> {
        self.rewards.get(index).copied()
    }

    #[must_use]
    pub fn action(&self, index: usize) -> Option<CompoundAction> {
        self.actions.get(index).copied()
    }

    #[must_use]
    pub fn terminal(&self, index: usize) -> Option<bool> {
        self.terminals.get(index).copied()
    }

    /// Gathers the transitions at `indices` into parallel columns.
    ///
    /// # Errors
    /// Returns `ReplayError::IndexOutOfRange` for an index outside the filled region.
    pub fn batch_get(&self, indices: &[usize]) -> Result<Minibatch, ReplayError> {
        let len = self.len();
        let mut batch = Minibatch {
            indices: indices.to_vec(),
            states: Vec::with_capacity(indices.len()),
            actions: Vec::with_capacity(indices.len()),
            rewards: Vec::with_capacity(indices.len()),
            next_states: Vec::with_capacity(indices.len()),
            terminals: Vec::with_capacity(indices.len()),
        };
        for &index in indices {
            if index >= len {
                return Err(ReplayError::IndexOutOfRange { index, len });
            }
            batch.states.push(self.states[self.slot_range(index)].to_vec());
            batch.next_states.push(self.states[self.slot_range(index + 1)].to_vec());
            batch.actions.push(self.actions[index]);
            batch.rewards.push(self.rewards[index]);
            batch.terminals.push(self.terminals[index]);
        }
        Ok(batch)
    }

    fn check_len(&self, state: &[f64]) -> Result<(), ReplayError> {
        if state.len() == self.state_len {
            Ok(())
        } else {
            Err(ReplayError::StateLength {
                expected: self.state_len,
                actual: state.len(),
            })
        }
    }

    const fn slot_range(&self, slot: usize) -> std::ops::Range<usize> {
        slot * self.state_len..(slot + 1) * self.state_len
    }

    fn write_slot(&mut self, slot: usize, state: &[f64]) {
        let range = self.slot_range(slot);
        self.states[range].copy_from_slice(state);
    }
}
