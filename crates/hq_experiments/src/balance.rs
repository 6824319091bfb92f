//! Design balance scoring.
//!
//! Zone results are grouped per design, period and solver variation, then
//! scored on how evenly the design spreads workload across its zones.
//! Lower spread, lower congestion and shorter trips give a higher score.

use std::collections::BTreeMap;

use hq_core::Capacity;
use serde::Serialize;

use crate::metrics::ZoneResult;

/// Zone metrics of one design rolled up for a period and solver variation.
#[derive(Debug, Clone, Serialize)]
pub struct DesignBalance {
    pub design_id: String,
    pub period: String,
    pub variation_id: usize,
    pub capacity: Capacity,
    pub max_iter: usize,
    pub zone_count: usize,
    pub total_estimated_workload: f64,
    pub mean_zone_workload: f64,
    /// Standard deviation of per-unit workload across zones.
    pub workload_std_dev: f64,
    /// Max minus min per-unit workload across zones.
    pub workload_spread: f64,
    /// Worst all-busy probability over the zones.
    pub max_all_busy_probability: f64,
    /// Travel time averaged over zones, weighted by calls.
    pub mean_travel_time: f64,
    /// Mean absolute relative workload error over zones with observations.
    pub mean_abs_workload_error: Option<f64>,
}

/// Roll zone results up into one [`DesignBalance`] per
/// (variation, design, period), ordered by that key.
pub fn summarize_designs(results: &[ZoneResult]) -> Vec<DesignBalance> {
    let mut groups: BTreeMap<(usize, &str, &str), Vec<&ZoneResult>> = BTreeMap::new();
    for result in results {
        groups
            .entry((
                result.variation_id,
                result.design_id.as_str(),
                result.period.as_str(),
            ))
            .or_default()
            .push(result);
    }

    groups
        .into_values()
        .map(|zones| summarize_group(&zones))
        .collect()
}

fn summarize_group(zones: &[&ZoneResult]) -> DesignBalance {
    let first = zones[0];
    let count = zones.len() as f64;

    // Workload per unit so zones of different size compare fairly.
    let per_unit: Vec<f64> = zones
        .iter()
        .map(|z| z.estimated_workload / z.n_atoms.max(1) as f64)
        .collect();
    let mean_per_unit = per_unit.iter().sum::<f64>() / count;
    let variance = per_unit
        .iter()
        .map(|w| (w - mean_per_unit).powi(2))
        .sum::<f64>()
        / count;
    let (min, max) = per_unit
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });

    let total_workload: f64 = zones.iter().map(|z| z.estimated_workload).sum();
    let total_calls: f64 = zones.iter().map(|z| z.total_calls).sum();
    let mean_travel_time = if total_calls > 0.0 {
        zones
            .iter()
            .map(|z| z.mean_travel_time * z.total_calls)
            .sum::<f64>()
            / total_calls
    } else {
        0.0
    };

    let errors: Vec<f64> = zones.iter().filter_map(|z| z.workload_error).collect();
    let mean_abs_workload_error = if errors.is_empty() {
        None
    } else {
        Some(errors.iter().map(|e| e.abs()).sum::<f64>() / errors.len() as f64)
    };

    DesignBalance {
        design_id: first.design_id.clone(),
        period: first.period.clone(),
        variation_id: first.variation_id,
        capacity: first.capacity,
        max_iter: first.max_iter,
        zone_count: zones.len(),
        total_estimated_workload: total_workload,
        mean_zone_workload: total_workload / count,
        workload_std_dev: variance.sqrt(),
        workload_spread: max - min,
        max_all_busy_probability: zones
            .iter()
            .map(|z| z.all_busy_probability)
            .fold(0.0, f64::max),
        mean_travel_time,
        mean_abs_workload_error,
    }
}

/// Configurable weights for the design balance score.
///
/// Every component is lower-is-better and enters the score inverted.
///
/// # Default Weights
///
/// - Workload spread: 0.4
/// - Workload standard deviation: 0.3
/// - Worst all-busy probability: 0.2
/// - Mean travel time: 0.1
#[derive(Debug, Clone, Copy)]
pub struct BalanceWeights {
    pub spread_weight: f64,
    pub std_dev_weight: f64,
    pub congestion_weight: f64,
    pub travel_time_weight: f64,
}

impl Default for BalanceWeights {
    fn default() -> Self {
        Self {
            spread_weight: 0.4,
            std_dev_weight: 0.3,
            congestion_weight: 0.2,
            travel_time_weight: 0.1,
        }
    }
}

impl BalanceWeights {
    pub fn new(
        spread_weight: f64,
        std_dev_weight: f64,
        congestion_weight: f64,
        travel_time_weight: f64,
    ) -> Self {
        Self {
            spread_weight,
            std_dev_weight,
            congestion_weight,
            travel_time_weight,
        }
    }
}

/// Normalize a metric value to [0, 1] range.
///
/// Uses min-max normalization: `(value - min) / (max - min)`.
/// If min == max, returns 0.5.
fn normalize_metric(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.5
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}

/// Calculate balance scores for all designs.
///
/// Normalizes each component across `designs` and returns the weighted sum,
/// in input order. Higher is more balanced.
pub fn calculate_balance_scores(designs: &[DesignBalance], weights: &BalanceWeights) -> Vec<f64> {
    if designs.is_empty() {
        return vec![];
    }

    let (spread_min, spread_max) = min_max(designs.iter().map(|d| d.workload_spread));
    let (std_min, std_max) = min_max(designs.iter().map(|d| d.workload_std_dev));
    let (busy_min, busy_max) = min_max(designs.iter().map(|d| d.max_all_busy_probability));
    let (travel_min, travel_max) = min_max(designs.iter().map(|d| d.mean_travel_time));

    designs
        .iter()
        .map(|design| {
            let spread = 1.0 - normalize_metric(design.workload_spread, spread_min, spread_max);
            let std_dev = 1.0 - normalize_metric(design.workload_std_dev, std_min, std_max);
            let busy = 1.0 - normalize_metric(design.max_all_busy_probability, busy_min, busy_max);
            let travel = 1.0 - normalize_metric(design.mean_travel_time, travel_min, travel_max);

            spread * weights.spread_weight
                + std_dev * weights.std_dev_weight
                + busy * weights.congestion_weight
                + travel * weights.travel_time_weight
        })
        .collect()
}
