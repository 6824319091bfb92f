//! Example: Zone design sweep over a synthetic 3x4 grid region.
//!
//! This example demonstrates how to:
//! 1. Build a region from travel time and distance matrices
//! 2. Sample random zone designs
//! 3. Evaluate every zone in parallel for both capacity regimes
//! 4. Score designs on workload balance
//! 5. Export results to CSV/JSON
//!
//! Set `RUST_LOG=hq_experiments=info` to log every zone evaluation.

use hq_core::Capacity;
use hq_experiments::{
    calculate_balance_scores, export_designs_to_csv, export_to_csv, export_to_json,
    find_best_design_index, run_parallel_evaluations, sample_random_designs, summarize_designs,
    BalanceWeights, DesignSpace, PeriodData, RegionData,
};
use tracing_subscriber::EnvFilter;

const ROWS: usize = 3;
const COLS: usize = 4;

fn grid_region() -> Result<RegionData, String> {
    let cells: Vec<(usize, usize)> = (0..ROWS)
        .flat_map(|r| (0..COLS).map(move |c| (r, c)))
        .collect();
    let atom_ids = cells.iter().map(|(r, c)| format!("cell_{r}_{c}")).collect();

    let distances: Vec<Vec<f64>> = cells
        .iter()
        .map(|&(r1, c1)| {
            cells
                .iter()
                .map(|&(r2, c2)| (r1.abs_diff(r2) + c1.abs_diff(c2)) as f64)
                .collect()
        })
        .collect();
    // 4 minutes to cross a cell, 2 minutes within it; one pair never observed
    let mut travel_times: Vec<Vec<f64>> = distances
        .iter()
        .map(|row| row.iter().map(|d| 2.0 + 4.0 * d).collect())
        .collect();
    travel_times[0][COLS * ROWS - 1] = 0.0;

    // minutes: 45 on scene per call, one year per period
    RegionData::new(atom_ids, travel_times, distances, 45.0, 365.0 * 24.0 * 60.0)
}

fn period(name: &str, region: &RegionData, scale: f64) -> PeriodData {
    region
        .atom_ids
        .iter()
        .enumerate()
        .fold(PeriodData::new(name), |data, (index, atom)| {
            // busier towards the first row
            let calls = scale * (900.0 - 300.0 * (index / COLS) as f64);
            data.with_calls(atom.clone(), calls)
                .with_observed_workload(atom.clone(), calls * 55.0)
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let region = grid_region()?;
    let designs = sample_random_designs(&region.atom_ids, 3, 20, 7);
    println!("Sampled {} designs", designs.len());

    let cases = DesignSpace::grid()
        .designs(designs)
        .periods(vec![
            period("2016", &region, 1.0),
            period("2017", &region, 1.1),
        ])
        .capacity(vec![Capacity::Zero, Capacity::Infinite])
        .generate();
    println!("Evaluating {} zones...", cases.len());

    let batch = run_parallel_evaluations(cases, &region, None)?;
    println!(
        "Completed {} zones ({} failed)",
        batch.results.len(),
        batch.failures.len()
    );
    for failure in &batch.failures {
        println!("  {}: {}", failure.case_id, failure.error);
    }

    let weights = BalanceWeights::default();
    let summaries = summarize_designs(&batch.results);
    let scores = calculate_balance_scores(&summaries, &weights);

    if let Some(best) = find_best_design_index(&summaries, &weights) {
        let design = &summaries[best];
        println!("\n=== Most Balanced Design ===");
        println!(
            "Design: {} ({}, capacity {})",
            design.design_id, design.period, design.capacity
        );
        println!("Score: {:.3}", scores[best]);
        println!("Workload spread: {:.1} min", design.workload_spread);
        println!("Worst all-busy: {:.4}", design.max_all_busy_probability);
        println!("Mean travel time: {:.2} min", design.mean_travel_time);
        if let Some(error) = design.mean_abs_workload_error {
            println!("Mean workload error: {:.1}%", error * 100.0);
        }
    }

    export_to_csv(&batch.results, "design_sweep_zones.csv")?;
    export_designs_to_csv(&summaries, &scores, "design_sweep_designs.csv")?;
    export_to_json(&batch.results, "design_sweep_zones.json")?;
    println!("\nResults exported to design_sweep_*.csv and design_sweep_zones.json");

    Ok(())
}
