//! Parallel zone-design evaluation on top of the hypercube queueing model.
//!
//! A region is split into zones, each zone is solved as an independent
//! hypercube model, and designs are compared on how evenly they spread the
//! estimated workload.
//!
//! # Quick Start
//!
//! ```no_run
//! use hq_experiments::{
//!     find_most_balanced_design, run_parallel_evaluations, sample_random_designs,
//!     BalanceWeights, DesignSpace, PeriodData, RegionData,
//! };
//! use hq_core::Capacity;
//!
//! # fn main() -> Result<(), String> {
//! let atoms: Vec<String> = (0..6).map(|i| format!("atom_{i}")).collect();
//! let matrix: Vec<Vec<f64>> = (0..6)
//!     .map(|i: usize| (0..6).map(|j: usize| i.abs_diff(j) as f64 + 1.0).collect())
//!     .collect();
//! let region = RegionData::new(atoms.clone(), matrix.clone(), matrix, 1.0, 1_000.0)?;
//!
//! let period = atoms
//!     .iter()
//!     .fold(PeriodData::new("2016"), |p, atom| {
//!         p.with_calls(atom.clone(), 100.0)
//!     });
//!
//! let cases = DesignSpace::grid()
//!     .designs(sample_random_designs(&atoms, 2, 10, 42))
//!     .periods(vec![period])
//!     .capacity(vec![Capacity::Zero, Capacity::Infinite])
//!     .generate();
//!
//! let batch = run_parallel_evaluations(cases, &region, None)?;
//! let best = find_most_balanced_design(&batch.results, &BalanceWeights::default());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`region`]: Region-wide matrices and zone input extraction
//! - [`parameters`]: Designs, periods and the evaluation grid
//! - [`runner`]: Parallel zone evaluation using rayon
//! - [`metrics`]: Metrics extraction from solved models
//! - [`balance`]: Design balance summaries and scores
//! - [`export`]: Result export to CSV/JSON

pub mod balance;
pub mod export;
pub mod metrics;
pub mod parameters;
pub mod region;
pub mod runner;

pub use balance::{calculate_balance_scores, summarize_designs, BalanceWeights, DesignBalance};
pub use export::{
    export_designs_to_csv, export_to_csv, export_to_json, find_best_design_index,
    find_most_balanced_design,
};
pub use metrics::ZoneResult;
pub use parameters::{
    sample_random_designs, DesignSpace, EvaluationCase, PeriodData, Zone, ZoneDesign,
};
pub use region::RegionData;
pub use runner::{run_parallel_evaluations, EvaluationBatch, EvaluationFailure};
