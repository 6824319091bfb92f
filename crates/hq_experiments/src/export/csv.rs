use crate::balance::DesignBalance;
use crate::metrics::ZoneResult;

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn export_to_csv_impl(
    results: &[ZoneResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "case_id",
        "variation_id",
        "design_id",
        "zone_id",
        "period",
        "capacity",
        "max_iter",
        "n_atoms",
        "total_calls",
        "total_arrival_rate",
        "total_probability",
        "all_busy_probability",
        "blocking_probability",
        "queue_delay_probability",
        "mean_travel_time",
        "max_travel_time",
        "estimated_workload",
        "observed_workload",
        "workload_error",
        "iterations",
        "converged",
    ])?;

    for result in results {
        wtr.write_record([
            &result.case_id,
            &result.variation_id.to_string(),
            &result.design_id,
            &result.zone_id,
            &result.period,
            &result.capacity.to_string(),
            &result.max_iter.to_string(),
            &result.n_atoms.to_string(),
            &result.total_calls.to_string(),
            &result.total_arrival_rate.to_string(),
            &result.total_probability.to_string(),
            &result.all_busy_probability.to_string(),
            &result.blocking_probability.to_string(),
            &result.queue_delay_probability.to_string(),
            &result.mean_travel_time.to_string(),
            &result.max_travel_time.to_string(),
            &result.estimated_workload.to_string(),
            &optional(result.observed_workload),
            &optional(result.workload_error),
            &result.iterations.to_string(),
            &optional(result.converged),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_designs_to_csv_impl(
    designs: &[DesignBalance],
    scores: &[f64],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    if designs.len() != scores.len() {
        return Err(format!(
            "Designs length ({}) doesn't match scores length ({})",
            designs.len(),
            scores.len()
        )
        .into());
    }

    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "design_id",
        "period",
        "variation_id",
        "capacity",
        "max_iter",
        "zone_count",
        "total_estimated_workload",
        "mean_zone_workload",
        "workload_std_dev",
        "workload_spread",
        "max_all_busy_probability",
        "mean_travel_time",
        "mean_abs_workload_error",
        "balance_score",
    ])?;

    for (design, score) in designs.iter().zip(scores) {
        wtr.write_record([
            &design.design_id,
            &design.period,
            &design.variation_id.to_string(),
            &design.capacity.to_string(),
            &design.max_iter.to_string(),
            &design.zone_count.to_string(),
            &design.total_estimated_workload.to_string(),
            &design.mean_zone_workload.to_string(),
            &design.workload_std_dev.to_string(),
            &design.workload_spread.to_string(),
            &design.max_all_busy_probability.to_string(),
            &design.mean_travel_time.to_string(),
            &optional(design.mean_abs_workload_error),
            &score.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
