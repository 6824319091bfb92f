//! Model inputs and the numeric helpers that prepare them.
//!
//! The helpers here cover what a zone-design driver does before it hands a
//! zone to the solver: rank units by distance, fill unobserved travel times
//! and cut the zone's rows and columns out of region-wide matrices.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{HypercubeError, HypercubeResult};
use crate::state_space::MAX_ATOMS;

/// Arrival rates, travel times and dispatch priorities for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypercubeInputs {
    /// Poisson arrival rate of calls from each atom.
    pub arrival_rates: Vec<f64>,
    /// `travel_times[i][j]`: mean travel time from unit i's home to atom j.
    pub travel_times: Vec<Vec<f64>>,
    /// `priorities[j]`: units in dispatch order for calls from atom j.
    pub priorities: Vec<Vec<usize>>,
}

impl HypercubeInputs {
    pub fn new(
        arrival_rates: Vec<f64>,
        travel_times: Vec<Vec<f64>>,
        priorities: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            arrival_rates,
            travel_times,
            priorities,
        }
    }

    /// Build inputs whose priorities rank units by increasing travel time.
    pub fn ranked_by_travel_time(arrival_rates: Vec<f64>, travel_times: Vec<Vec<f64>>) -> Self {
        let priorities = priority_from_costs(&transpose(&travel_times));
        Self::new(arrival_rates, travel_times, priorities)
    }

    pub fn n_atoms(&self) -> usize {
        self.arrival_rates.len()
    }

    pub fn total_arrival_rate(&self) -> f64 {
        self.arrival_rates.iter().sum()
    }

    /// Check shapes and values against `n_atoms`.
    pub fn validate(&self, n_atoms: usize) -> HypercubeResult<()> {
        if n_atoms == 0 {
            return Err(HypercubeError::NoAtoms);
        }
        if n_atoms > MAX_ATOMS {
            return Err(HypercubeError::TooManyAtoms {
                n_atoms,
                max: MAX_ATOMS,
            });
        }

        check_len("arrival rates", n_atoms, self.arrival_rates.len())?;
        check_len("travel time rows", n_atoms, self.travel_times.len())?;
        for row in &self.travel_times {
            check_len("travel time columns", n_atoms, row.len())?;
        }
        check_len("priority rows", n_atoms, self.priorities.len())?;
        for row in &self.priorities {
            check_len("priority columns", n_atoms, row.len())?;
        }

        for (atom, &value) in self.arrival_rates.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(HypercubeError::InvalidArrivalRate { atom, value });
            }
        }
        for (from, row) in self.travel_times.iter().enumerate() {
            for (to, &value) in row.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(HypercubeError::InvalidTravelTime { from, to, value });
                }
            }
        }
        for (atom, row) in self.priorities.iter().enumerate() {
            let mut seen = vec![false; n_atoms];
            for &unit in row {
                if unit >= n_atoms || seen[unit] {
                    return Err(HypercubeError::InvalidPriorityRow { atom });
                }
                seen[unit] = true;
            }
        }

        if self.total_arrival_rate() <= 0.0 {
            return Err(HypercubeError::ZeroArrivalRate);
        }
        Ok(())
    }
}

fn check_len(what: &str, expected: usize, actual: usize) -> HypercubeResult<()> {
    if expected != actual {
        return Err(HypercubeError::ShapeMismatch {
            what: what.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Row-wise stable argsort: `result[j]` lists column indices of `costs[j]`
/// from cheapest to most expensive. Ties keep index order.
pub fn priority_from_costs(costs: &[Vec<f64>]) -> Vec<Vec<usize>> {
    costs
        .iter()
        .map(|row| {
            let mut order: Vec<usize> = (0..row.len()).collect();
            order.sort_by(|&a, &b| row[a].total_cmp(&row[b]));
            order
        })
        .collect()
}

pub fn transpose(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let columns = matrix.first().map_or(0, Vec::len);
    (0..columns)
        .map(|col| matrix.iter().map(|row| row[col]).collect())
        .collect()
}

/// Replace unobserved (`0.0`) entries by the mean of the observed entries in
/// the same column. Columns with nothing observed are left as they are.
pub fn impute_missing_mean(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let columns = matrix.first().map_or(0, Vec::len);
    let means: Vec<Option<f64>> = (0..columns)
        .map(|col| {
            let observed: Vec<f64> = matrix
                .iter()
                .map(|row| row[col])
                .filter(|&value| value != 0.0)
                .collect();
            if observed.is_empty() {
                None
            } else {
                Some(observed.iter().sum::<f64>() / observed.len() as f64)
            }
        })
        .collect();

    matrix
        .iter()
        .map(|row| {
            row.iter()
                .zip(&means)
                .map(|(&value, mean)| match mean {
                    Some(mean) if value == 0.0 => *mean,
                    _ => value,
                })
                .collect()
        })
        .collect()
}

/// Rows and columns of `matrix` for the `selected` ids, in `selected` order.
///
/// Returns `None` if any selected id is missing from `all`.
pub fn select_submatrix<T: Clone, I: PartialEq>(
    matrix: &[Vec<T>],
    selected: &[I],
    all: &[I],
) -> Option<Vec<Vec<T>>> {
    let positions: Vec<usize> = selected
        .iter()
        .map(|id| all.iter().position(|candidate| candidate == id))
        .collect::<Option<_>>()?;
    Some(
        positions
            .iter()
            .map(|&row| {
                positions
                    .iter()
                    .map(|&col| matrix[row][col].clone())
                    .collect()
            })
            .collect(),
    )
}

/// Seeded random instance: rates and travel times uniform in `[0, 1)`, each
/// priority row a random permutation.
pub fn random_instance(n_atoms: usize, seed: u64) -> HypercubeInputs {
    let mut rng = StdRng::seed_from_u64(seed);
    let arrival_rates = (0..n_atoms).map(|_| rng.gen::<f64>()).collect();
    let travel_times = (0..n_atoms)
        .map(|_| (0..n_atoms).map(|_| rng.gen::<f64>()).collect())
        .collect();
    let priorities = (0..n_atoms)
        .map(|_| {
            let mut row: Vec<usize> = (0..n_atoms).collect();
            row.shuffle(&mut rng);
            row
        })
        .collect();
    HypercubeInputs::new(arrival_rates, travel_times, priorities)
}
