//! Design space for zone-design evaluations.
//!
//! A design partitions the region's atoms into zones, each staffed with one
//! unit per atom. Every (design, zone, period, solver variation) combination
//! becomes one [`EvaluationCase`].

use std::collections::BTreeMap;

use hq_core::{Capacity, SolverParams};
use serde::{Deserialize, Serialize};

#[path = "parameters/sampling.rs"]
mod sampling;

/// One zone of a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: String,
    pub atom_ids: Vec<String>,
}

impl Zone {
    pub fn new(zone_id: impl Into<String>, atom_ids: Vec<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            atom_ids,
        }
    }
}

/// A partition of the region into zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDesign {
    pub design_id: String,
    pub zones: Vec<Zone>,
}

impl ZoneDesign {
    pub fn new(design_id: impl Into<String>, zones: Vec<Zone>) -> Self {
        Self {
            design_id: design_id.into(),
            zones,
        }
    }
}

/// Observed demand for one period (for example, one year).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodData {
    pub period: String,
    /// Calls per atom over the period.
    pub call_counts: BTreeMap<String, f64>,
    /// Observed busy time per atom over the period, when known.
    pub observed_workload: BTreeMap<String, f64>,
}

impl PeriodData {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            ..Default::default()
        }
    }

    pub fn with_calls(mut self, atom_id: impl Into<String>, calls: f64) -> Self {
        self.call_counts.insert(atom_id.into(), calls);
        self
    }

    pub fn with_observed_workload(mut self, atom_id: impl Into<String>, workload: f64) -> Self {
        self.observed_workload.insert(atom_id.into(), workload);
        self
    }

    /// Call counts for `atom_ids`, zero where nothing was recorded.
    pub fn calls_for(&self, atom_ids: &[String]) -> Vec<f64> {
        atom_ids
            .iter()
            .map(|atom| self.call_counts.get(atom).copied().unwrap_or(0.0))
            .collect()
    }

    /// Summed observed workload of `atom_ids`; `None` if any atom is missing.
    pub fn observed_for(&self, atom_ids: &[String]) -> Option<f64> {
        atom_ids
            .iter()
            .map(|atom| self.observed_workload.get(atom).copied())
            .sum()
    }
}

/// A single zone evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationCase {
    /// Unique id of this case within the generated batch.
    pub case_id: String,
    /// Index of the solver variation the case uses.
    pub variation_id: usize,
    pub design_id: String,
    pub zone_id: String,
    pub period: String,
    pub atom_ids: Vec<String>,
    pub call_counts: Vec<f64>,
    pub observed_workload: Option<f64>,
    pub solver: SolverParams,
}

impl EvaluationCase {
    pub fn total_calls(&self) -> f64 {
        self.call_counts.iter().sum()
    }
}

/// Defines which designs, periods and solver variations to evaluate.
#[derive(Debug, Clone)]
pub struct DesignSpace {
    /// Base solver parameters (used as defaults for unspecified variations).
    base: SolverParams,
    designs: Vec<ZoneDesign>,
    periods: Vec<PeriodData>,
    capacities: Vec<Capacity>,
    max_iters: Vec<usize>,
}

impl DesignSpace {
    pub fn new() -> Self {
        Self {
            base: SolverParams::default(),
            designs: vec![],
            periods: vec![],
            capacities: vec![],
            max_iters: vec![],
        }
    }

    /// Create a new design space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn designs(mut self, designs: Vec<ZoneDesign>) -> Self {
        self.designs = designs;
        self
    }

    pub fn periods(mut self, periods: Vec<PeriodData>) -> Self {
        self.periods = periods;
        self
    }

    /// Set capacity regimes to explore.
    pub fn capacity(mut self, capacities: Vec<Capacity>) -> Self {
        self.capacities = capacities;
        self
    }

    /// Set Jacobi sweep budgets to explore.
    pub fn max_iter(mut self, max_iters: Vec<usize>) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set base solver parameters (used as defaults).
    pub fn with_base(mut self, base: SolverParams) -> Self {
        self.base = base;
        self
    }

    /// Solver variations as the Cartesian product of capacities and budgets.
    fn solver_variations(&self) -> Vec<SolverParams> {
        let capacities = if self.capacities.is_empty() {
            vec![self.base.capacity]
        } else {
            self.capacities.clone()
        };
        let max_iters = if self.max_iters.is_empty() {
            vec![self.base.max_iter]
        } else {
            self.max_iters.clone()
        };

        let mut variations = Vec::with_capacity(capacities.len() * max_iters.len());
        for &capacity in &capacities {
            for &max_iter in &max_iters {
                variations.push(self.base.with_capacity(capacity).with_max_iter(max_iter));
            }
        }
        variations
    }

    /// Generate every (variation, design, period, zone) case.
    pub fn generate(&self) -> Vec<EvaluationCase> {
        let variations = self.solver_variations();
        let mut cases = Vec::new();

        for (variation_id, solver) in variations.iter().enumerate() {
            for design in &self.designs {
                for period in &self.periods {
                    for zone in &design.zones {
                        cases.push(EvaluationCase {
                            case_id: format!("case_{}", cases.len()),
                            variation_id,
                            design_id: design.design_id.clone(),
                            zone_id: zone.zone_id.clone(),
                            period: period.period.clone(),
                            atom_ids: zone.atom_ids.clone(),
                            call_counts: period.calls_for(&zone.atom_ids),
                            observed_workload: period.observed_for(&zone.atom_ids),
                            solver: *solver,
                        });
                    }
                }
            }
        }

        cases
    }
}

impl Default for DesignSpace {
    fn default() -> Self {
        Self::new()
    }
}

pub use sampling::sample_random_designs;
