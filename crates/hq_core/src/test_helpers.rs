//! Test helpers for common model fixtures.
//!
//! This module provides shared inputs to reduce duplication across test files.

use crate::inputs::HypercubeInputs;

/// Two atoms, unit rates, each unit preferring its own atom and a travel
/// time of 1 at home and 2 across.
pub fn symmetric_two_atom_inputs() -> HypercubeInputs {
    HypercubeInputs::new(
        vec![1.0, 1.0],
        vec![vec![1.0, 2.0], vec![2.0, 1.0]],
        vec![vec![0, 1], vec![1, 0]],
    )
}

/// `n` atoms on a line, one unit per atom, travel time equal to the distance
/// in atoms plus one, priorities by proximity. Every atom gets `rate`.
pub fn line_inputs(n: usize, rate: f64) -> HypercubeInputs {
    let travel_times = (0..n)
        .map(|from| (0..n).map(|to| from.abs_diff(to) as f64 + 1.0).collect())
        .collect();
    HypercubeInputs::ranked_by_travel_time(vec![rate; n], travel_times)
}

/// Assert two floats agree within `tolerance`, with a readable message.
///
/// # Panics
///
/// Panics when `|actual - expected| > tolerance`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual} (tolerance {tolerance})"
    );
}
