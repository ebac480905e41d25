//! Observation encoding.
//!
//! This module provides:
//! - Classification of raw grid codes into canonical element classes
//! - Multi-range directional presence scans around the ego cell
//! - Assembly of the fixed-width feature vector fed to the approximator

mod directions;
mod element;
mod features;

pub use directions::{encode, window, Direction, DirectionTensor, Range};
pub use element::{classify, ElementClass};
pub use features::{FeatureEncoder, FeatureVector, ScalarFeature};
