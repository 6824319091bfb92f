//! Region-wide inputs shared by every zone of a design.
//!
//! A region holds one row/column per atom for travel times and distances.
//! Zones cut their own matrices out of these, so a design can be re-drawn
//! without recomputing anything region-wide.

use hq_core::inputs::{impute_missing_mean, priority_from_costs, select_submatrix};
use hq_core::HypercubeInputs;
use serde::{Deserialize, Serialize};

/// Region-wide matrices and service statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionData {
    /// Atom identifiers; row/column order of both matrices.
    pub atom_ids: Vec<String>,
    /// Observed mean travel times; `0.0` marks an unobserved pair.
    pub travel_times: Vec<Vec<f64>>,
    /// Distances used to rank units for each atom.
    pub distances: Vec<Vec<f64>>,
    /// Mean on-scene service time per call.
    pub mean_service_time: f64,
    /// Length of one period, in the same unit as `mean_service_time`.
    pub period_length: f64,
}

impl RegionData {
    /// Build a region, filling unobserved travel times with column means.
    pub fn new(
        atom_ids: Vec<String>,
        travel_times: Vec<Vec<f64>>,
        distances: Vec<Vec<f64>>,
        mean_service_time: f64,
        period_length: f64,
    ) -> Result<Self, String> {
        let n = atom_ids.len();
        if !is_square(&travel_times, n) {
            return Err(format!("travel time matrix must be {n}x{n}"));
        }
        if !is_square(&distances, n) {
            return Err(format!("distance matrix must be {n}x{n}"));
        }
        if mean_service_time.is_nan()
            || mean_service_time <= 0.0
            || period_length.is_nan()
            || period_length <= 0.0
        {
            return Err(format!(
                "service time ({mean_service_time}) and period length ({period_length}) must be positive"
            ));
        }

        Ok(Self {
            atom_ids,
            travel_times: impute_missing_mean(&travel_times),
            distances,
            mean_service_time,
            period_length,
        })
    }

    /// Offered load of an atom: calls per period expressed per unit of
    /// service time, so that units complete service at rate one.
    pub fn arrival_rate(&self, calls: f64) -> f64 {
        calls / self.period_length * self.mean_service_time
    }

    /// Solver inputs for a zone made of `atom_ids` with the given call counts.
    pub fn zone_inputs(
        &self,
        atom_ids: &[String],
        call_counts: &[f64],
    ) -> Result<HypercubeInputs, String> {
        if atom_ids.len() != call_counts.len() {
            return Err(format!(
                "zone has {} atoms but {} call counts",
                atom_ids.len(),
                call_counts.len()
            ));
        }
        let travel_times = select_submatrix(&self.travel_times, atom_ids, &self.atom_ids)
            .ok_or_else(|| format!("zone references unknown atoms: {atom_ids:?}"))?;
        let distances = select_submatrix(&self.distances, atom_ids, &self.atom_ids)
            .ok_or_else(|| format!("zone references unknown atoms: {atom_ids:?}"))?;

        let arrival_rates = call_counts.iter().map(|&c| self.arrival_rate(c)).collect();
        Ok(HypercubeInputs::new(
            arrival_rates,
            travel_times,
            priority_from_costs(&distances),
        ))
    }
}

fn is_square(matrix: &[Vec<f64>], n: usize) -> bool {
    matrix.len() == n && matrix.iter().all(|row| row.len() == n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn three_atom_region() -> RegionData {
        RegionData::new(
            ids(&["a", "b", "c"]),
            vec![
                vec![1.0, 0.0, 3.0],
                vec![2.0, 1.0, 0.0],
                vec![4.0, 3.0, 1.0],
            ],
            vec![
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 1.0],
                vec![2.0, 1.0, 0.0],
            ],
            0.5,
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn unobserved_travel_times_are_imputed() {
        let region = three_atom_region();
        assert_eq!(region.travel_times[0][1], 2.0);
        assert_eq!(region.travel_times[1][2], 2.0);
    }

    #[test]
    fn zone_inputs_follow_selection_order() {
        let region = three_atom_region();
        let atoms = ids(&["c", "a"]);
        let inputs = region.zone_inputs(&atoms, &[40.0, 20.0]).unwrap();

        assert_eq!(inputs.travel_times, vec![vec![1.0, 4.0], vec![3.0, 1.0]]);
        assert_eq!(inputs.priorities, vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(inputs.arrival_rates, vec![0.2, 0.1]);
    }

    #[test]
    fn unknown_atoms_are_reported() {
        let region = three_atom_region();
        let err = region.zone_inputs(&ids(&["z"]), &[1.0]).unwrap_err();
        assert!(err.contains("unknown atoms"));
    }

    #[test]
    fn mismatched_counts_are_reported() {
        let region = three_atom_region();
        assert!(region.zone_inputs(&ids(&["a", "b"]), &[1.0]).is_err());
    }

    #[test]
    fn region_rejects_bad_shapes() {
        let err = RegionData::new(ids(&["a", "b"]), vec![vec![1.0]], vec![vec![0.0]], 1.0, 1.0)
            .unwrap_err();
        assert!(err.contains("travel time"));
    }

    fn one_atom_region(mean_service_time: f64, period_length: f64) -> Result<RegionData, String> {
        RegionData::new(
            ids(&["a"]),
            vec![vec![1.0]],
            vec![vec![0.0]],
            mean_service_time,
            period_length,
        )
    }

    #[test]
    fn region_rejects_non_positive_or_nan_times() {
        assert!(one_atom_region(0.0, 1.0).is_err());
        assert!(one_atom_region(1.0, -5.0).is_err());
        assert!(one_atom_region(f64::NAN, 1.0).is_err());
        let err = one_atom_region(1.0, f64::NAN).unwrap_err();
        assert!(err.contains("must be positive"));
        assert!(one_atom_region(0.5, 100.0).is_ok());
    }
}
