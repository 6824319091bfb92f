//! Result export and analysis utilities.
//!
//! This module provides functions to export zone and design results to CSV
//! and JSON, and to find the most balanced design of a sweep.

use std::path::Path;

use serde::Serialize;

use crate::balance::{BalanceWeights, DesignBalance};
use crate::metrics::ZoneResult;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/ranking.rs"]
mod ranking;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export any serializable rows (zone results, design balances, failures)
/// as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json<T: Serialize>(
    items: &[T],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(items, file)
}

/// Export zone results to CSV format, one row per zone evaluation.
///
/// Per-unit travel times are left out; use JSON to keep them.
///
/// # Errors
///
/// Returns an error if `results` is empty or file creation or CSV writing fails.
pub fn export_to_csv(
    results: &[ZoneResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, file)
}

/// Export design summaries with their balance scores to CSV format.
///
/// # Errors
///
/// Returns an error if `designs` is empty, if `designs` and `scores` differ
/// in length, or if file creation or CSV writing fails.
pub fn export_designs_to_csv(
    designs: &[DesignBalance],
    scores: &[f64],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(designs)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_designs_to_csv_impl(designs, scores, file)
}

/// Find the design summary with the highest balance score.
///
/// Returns `None` if `results` is empty.
pub fn find_most_balanced_design(
    results: &[ZoneResult],
    weights: &BalanceWeights,
) -> Option<DesignBalance> {
    ranking::find_most_balanced_design_impl(results, weights)
}

/// Index of the highest-scoring design in `designs`.
pub fn find_best_design_index(
    designs: &[DesignBalance],
    weights: &BalanceWeights,
) -> Option<usize> {
    ranking::find_best_index_by_balance(designs, weights)
}
