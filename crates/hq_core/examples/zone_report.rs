//! Solve a five-atom zone under both capacity regimes and print the metrics.
//!
//! Run with: cargo run -p hq_core --example zone_report

use hq_core::{Capacity, HypercubeInputs, HypercubeModel, SolverParams};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    // Five atoms along a corridor, busiest in the middle.
    let arrival_rates = vec![0.3, 0.5, 0.9, 0.5, 0.3];
    let corridor = |from: usize, to: usize| 2.0 + 3.0 * from.abs_diff(to) as f64;
    let travel_times: Vec<Vec<f64>> = (0..5)
        .map(|from| (0..5).map(|to| corridor(from, to)).collect())
        .collect();
    let inputs = HypercubeInputs::ranked_by_travel_time(arrival_rates, travel_times);

    for capacity in [Capacity::Zero, Capacity::Infinite] {
        let params = SolverParams::default()
            .with_capacity(capacity)
            .with_max_iter(500)
            .with_tolerance(1e-10);
        let model = HypercubeModel::solve(inputs.clone(), params)?;
        let convergence = model.convergence();

        println!("--- capacity = {capacity} ---");
        println!(
            "Iterations: {} (residual {:.2e}, converged {:?})",
            convergence.iterations, convergence.residual, convergence.converged
        );
        println!("Total probability: {:.8}", model.total_probability());
        println!("All units busy: {:.4}", model.all_busy_probability());
        if capacity == Capacity::Infinite {
            println!("Queue delay: {:.4}", model.queue_delay_probability());
        } else {
            println!("Blocking probability: {:.4}", model.blocking_probability());
        }

        let workload = model.unit_workload();
        for (unit, travel) in model.average_travel_times().iter().enumerate() {
            println!(
                "  unit {unit}: share of dispatches {:.3}  avg travel {:.3}",
                workload[unit], travel
            );
        }
        println!(
            "Estimated workload for 1000 calls (service time 20): {:.1}",
            model.estimated_workload(1000.0, 20.0)
        );
        println!();
    }

    Ok(())
}
