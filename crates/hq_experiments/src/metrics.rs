//! Metrics extraction from solved zone models.
//!
//! This module flattens a solved [`HypercubeModel`] into a row of
//! zone-level metrics: blocking and queueing probabilities, travel times and
//! workload estimates set against the observed workload.

use hq_core::{Capacity, HypercubeModel};

use crate::parameters::EvaluationCase;

/// Aggregated metrics from a single zone evaluation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ZoneResult {
    pub case_id: String,
    pub variation_id: usize,
    pub design_id: String,
    pub zone_id: String,
    pub period: String,
    pub capacity: Capacity,
    pub max_iter: usize,
    /// Number of atoms (and units) in the zone.
    pub n_atoms: usize,
    /// Calls recorded in the zone over the period.
    pub total_calls: f64,
    /// Offered load of the zone.
    pub total_arrival_rate: f64,
    /// ΣΠ + ΣΠ_Q; one when the solver has converged.
    pub total_probability: f64,
    pub all_busy_probability: f64,
    /// Share of calls lost (zero capacity only).
    pub blocking_probability: f64,
    /// Share of calls that wait (infinite capacity only).
    pub queue_delay_probability: f64,
    /// Travel time averaged over units, weighted by their dispatch share.
    pub mean_travel_time: f64,
    pub max_travel_time: f64,
    /// Modelled busy time over the period.
    pub estimated_workload: f64,
    pub observed_workload: Option<f64>,
    /// Relative error of the estimate against the observation.
    pub workload_error: Option<f64>,
    pub iterations: usize,
    pub converged: Option<bool>,
    /// Tu per unit, in zone atom order.
    pub unit_travel_times: Vec<f64>,
}

impl ZoneResult {
    fn relative_error(estimated: f64, observed: Option<f64>) -> Option<f64> {
        observed.filter(|&o| o > 0.0).map(|o| (estimated - o) / o)
    }

    fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
    }
}

/// Extract metrics from a solved zone model.
pub fn extract_metrics(
    case: &EvaluationCase,
    model: &HypercubeModel,
    mean_service_time: f64,
) -> ZoneResult {
    let total_calls = case.total_calls();
    let travel_times = model.average_travel_times();
    let estimated_workload = model.estimated_workload(total_calls, mean_service_time);
    let convergence = model.convergence();

    ZoneResult {
        case_id: case.case_id.clone(),
        variation_id: case.variation_id,
        design_id: case.design_id.clone(),
        zone_id: case.zone_id.clone(),
        period: case.period.clone(),
        capacity: case.solver.capacity,
        max_iter: case.solver.max_iter,
        n_atoms: model.n_atoms(),
        total_calls,
        total_arrival_rate: model.inputs().total_arrival_rate(),
        total_probability: model.total_probability(),
        all_busy_probability: model.all_busy_probability(),
        blocking_probability: model.blocking_probability(),
        queue_delay_probability: model.queue_delay_probability(),
        mean_travel_time: ZoneResult::weighted_mean(travel_times, &model.unit_workload()),
        max_travel_time: travel_times.iter().cloned().fold(0.0, f64::max),
        estimated_workload,
        observed_workload: case.observed_workload,
        workload_error: ZoneResult::relative_error(estimated_workload, case.observed_workload),
        iterations: convergence.iterations,
        converged: convergence.converged,
        unit_travel_times: travel_times.to_vec(),
    }
}
