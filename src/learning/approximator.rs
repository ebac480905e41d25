//! Action-value function approximation.
//!
//! The agent only needs two operations from its approximator: predict the
//! 12 action values of a state, and move those predictions toward a target
//! vector for that same state. The state is passed to both calls, so an
//! update never depends on which state was predicted last.

use rand::Rng;

use crate::learning::params::{INIT_WEIGHT_SCALE, NUM_ACTIONS};

/// Estimated value of each compound action, indexed by action id.
pub type ActionValues = [f64; NUM_ACTIONS];

pub trait ActionValueModel {
    fn predict(&self, state: &[f64]) -> ActionValues;
    fn update(&mut self, state: &[f64], target: &ActionValues);
}

/// Index of the largest value; ties go to the lowest index.
#[must_use]
pub fn argmax(values: &ActionValues) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

#[must_use]
pub fn max_value(values: &ActionValues) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Linear action-value model trained by per-sample squared-error SGD.
#[derive(Clone, Debug)]
pub struct LinearModel {
    state_len: usize,
    learning_rate: f64,
    /// Row-major: one row of `state_len` weights per action.
    weights: Vec<f64>,
    bias: ActionValues,
}

impl LinearModel {
    /// Creates a model with all weights at zero.
    #[must_use]
    pub fn zeros(state_len: usize, learning_rate: f64) -> Self {
        Self {
            state_len,
            learning_rate,
            weights: vec![0.0; NUM_ACTIONS * state_len],
            bias: [0.0; NUM_ACTIONS],
        }
    }

    /// Creates a model with small uniform random weights.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(state_len: usize, learning_rate: f64, rng: &mut R) -> Self {
        let mut model = Self::zeros(state_len, learning_rate);
        for w in &mut model.weights {
            *w = rng.random_range(-INIT_WEIGHT_SCALE..INIT_WEIGHT_SCALE);
        }
        model
    }

    #[must_use]
    pub const fn state_len(&self) -> usize {
        self.state_len
    }

    fn row(&self, action: usize) -> &[f64] {
        &self.weights[action * self.state_len..(action + 1) * self.state_len]
    }
}

impl ActionValueModel for LinearModel {
    fn predict(&self, state: &[f64]) -> ActionValues {
        debug_assert_eq!(state.len(), self.state_len);
        let mut values = self.bias;
        for (action, value) in values.iter_mut().enumerate() {
            *value += self
                .row(action)
                .iter()
                .zip(state)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        }
        values
    }

    fn update(&mut self, state: &[f64], target: &ActionValues) {
        let predicted = self.predict(state);
        for action in 0..NUM_ACTIONS {
            let step = self.learning_rate * (target[action] - predicted[action]);
            if step == 0.0 {
                continue;
            }
            self.bias[action] += step;
            let start = action * self.state_len;
            for (w, x) in self.weights[start..start + self.state_len].iter_mut().zip(state) {
                *w += step * x;
            }
        }
    }
}
