//! Parallel zone evaluation using rayon.
//!
//! This module provides functions to solve a single zone and to evaluate
//! whole batches of zones in parallel for design sweeps.

use hq_core::HypercubeModel;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use crate::metrics::{extract_metrics, ZoneResult};
use crate::parameters::EvaluationCase;
use crate::region::RegionData;

/// A case that could not be solved, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationFailure {
    pub case_id: String,
    pub design_id: String,
    pub zone_id: String,
    pub error: String,
}

/// Results of a batch, in input order, plus the cases that failed.
#[derive(Debug, Clone, Default)]
pub struct EvaluationBatch {
    pub results: Vec<ZoneResult>,
    pub failures: Vec<EvaluationFailure>,
}

impl EvaluationBatch {
    pub fn len(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Solve one zone and extract its metrics.
///
/// Cuts the zone's matrices out of `region`, converts call counts to
/// arrival rates and runs the hypercube model with the case's solver
/// parameters.
pub fn run_single_evaluation(
    case: &EvaluationCase,
    region: &RegionData,
) -> Result<ZoneResult, String> {
    let inputs = region.zone_inputs(&case.atom_ids, &case.call_counts)?;
    let model = HypercubeModel::solve(inputs, case.solver).map_err(|error| {
        format!(
            "{} (design {}, zone {}): {error}",
            case.case_id, case.design_id, case.zone_id
        )
    })?;

    let result = extract_metrics(case, &model, region.mean_service_time);
    tracing::info!(
        case_id = %case.case_id,
        design_id = %case.design_id,
        zone_id = %case.zone_id,
        period = %case.period,
        capacity = %case.solver.capacity,
        all_busy = result.all_busy_probability,
        estimated_workload = result.estimated_workload,
        "zone evaluated"
    );
    Ok(result)
}

/// Evaluate many zones in parallel.
///
/// # Arguments
///
/// * `cases` - Cases to evaluate
/// * `region` - Region the zones are cut from
/// * `num_threads` - Optional number of threads to use. If None, uses rayon's default.
pub fn run_parallel_evaluations(
    cases: Vec<EvaluationCase>,
    region: &RegionData,
    num_threads: Option<usize>,
) -> Result<EvaluationBatch, String> {
    run_parallel_evaluations_with_progress(cases, region, num_threads, true)
}

/// Evaluate many zones in parallel with optional progress bar.
///
/// Every case runs independently with no shared state. A failing case is
/// recorded in [`EvaluationBatch::failures`] and does not stop the batch.
pub fn run_parallel_evaluations_with_progress(
    cases: Vec<EvaluationCase>,
    region: &RegionData,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<EvaluationBatch, String> {
    let total = cases.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .map_err(|error| format!("Invalid progress template: {error}"))?
            .progress_chars("#>-");
        bar.set_style(style);
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|error| format!("Failed to create thread pool: {error}"))?;

    let pb_clone = pb.clone();
    let outcomes: Vec<Result<ZoneResult, EvaluationFailure>> = pool.install(|| {
        cases
            .par_iter()
            .map(|case| {
                let outcome = run_single_evaluation(case, region).map_err(|error| {
                    tracing::warn!(case_id = %case.case_id, %error, "zone evaluation failed");
                    EvaluationFailure {
                        case_id: case.case_id.clone(),
                        design_id: case.design_id.clone(),
                        zone_id: case.zone_id.clone(),
                        error,
                    }
                });
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                outcome
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    let mut batch = EvaluationBatch::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => batch.results.push(result),
            Err(failure) => batch.failures.push(failure),
        }
    }
    tracing::info!(
        total,
        succeeded = batch.results.len(),
        failed = batch.failures.len(),
        "batch evaluated"
    );
    Ok(batch)
}
