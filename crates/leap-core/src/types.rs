//! Core data types for Leap.
//!
//! A database is a flat list of `(path, weight)` entries. Weights are plain
//! `f64` values that are kept non-negative by the helpers in this module;
//! every arithmetic rule the store applies to a weight lives here as a pure
//! function so it can be tested on its own.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Default increment applied when a directory is visited.
pub const DEFAULT_INCREMENT: f64 = 10.0;

/// Default decrement applied by an explicit decrease.
pub const DEFAULT_DECREMENT: f64 = 15.0;

/// Multiplier applied to every weight during maintenance.
pub const DECAY_FACTOR: f64 = 0.9;

/// Share of entries dropped when the store grows past its ceiling.
pub const EVICTION_FRACTION: f64 = 0.1;

/// A single weighted directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Absolute directory path, without trailing separators
    pub path: String,

    /// Non-negative usage weight
    pub weight: f64,
}

impl Entry {
    /// Create a new entry. Negative or non-finite weights are clamped to 0.
    pub fn new(path: impl Into<String>, weight: f64) -> Self {
        Entry {
            path: path.into(),
            weight: clamp_weight(weight),
        }
    }

    /// Ordering used everywhere entries are ranked: heaviest first, then by
    /// path so that equal weights still sort deterministically.
    pub fn rank_cmp(&self, other: &Entry) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}:\t{}", self.weight, self.path)
    }
}

/// Force a weight into the valid range.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Combine an existing weight with an increment in quadrature.
///
/// Early visits raise the weight quickly; once a directory is heavy, further
/// visits add less and less.
pub fn grow_weight(current: f64, increment: f64) -> f64 {
    clamp_weight((current * current + increment * increment).sqrt())
}

/// Subtract a decrement, stopping at zero.
pub fn shrink_weight(current: f64, decrement: f64) -> f64 {
    if current < decrement {
        0.0
    } else {
        clamp_weight(current - decrement)
    }
}

/// Apply one round of maintenance decay.
pub fn decay_weight(current: f64) -> f64 {
    clamp_weight(current * DECAY_FACTOR)
}

/// Number of entries to evict when `count` exceeds `ceiling`.
pub fn eviction_count(count: usize, ceiling: usize) -> usize {
    if count > ceiling {
        (EVICTION_FRACTION * count as f64).floor() as usize
    } else {
        0
    }
}
