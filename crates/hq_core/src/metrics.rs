//! Dispatch fractions and expected travel times derived from solved
//! probabilities.

use serde::Serialize;

use crate::params::Capacity;
use crate::solver::SteadyState;
use crate::state_space::StateSpace;

/// Fractions of all calls that send unit `n` to atom `j`, as `[n][j]`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFractions {
    /// Dispatches that incur no queueing delay.
    pub immediate: Vec<Vec<f64>>,
    /// Dispatches that waited in queue first (always zero for zero capacity).
    pub delayed: Vec<Vec<f64>>,
}

impl DispatchFractions {
    /// Element-wise `immediate + delayed`.
    pub fn total(&self) -> Vec<Vec<f64>> {
        self.immediate
            .iter()
            .zip(&self.delayed)
            .map(|(immediate, delayed)| immediate.iter().zip(delayed).map(|(a, b)| a + b).collect())
            .collect()
    }

    /// Share of all dispatches handled by each unit.
    pub fn unit_shares(&self) -> Vec<f64> {
        self.total().iter().map(|row| row.iter().sum()).collect()
    }
}

/// States in which `unit` is idle and ranks first among idle units in
/// `priority` (the set E(n, j) for `priority = P[j]`).
pub fn optimal_dispatch_states(space: &StateSpace, priority: &[usize], unit: usize) -> Vec<usize> {
    (0..space.len())
        .filter(|&index| space.optimal_unit(priority, index) == Some(unit))
        .collect()
}

/// Mass of E(n, j) for every unit and atom, as `[n][j]`.
fn optimal_dispatch_mass(
    space: &StateSpace,
    priorities: &[Vec<usize>],
    probabilities: &[f64],
) -> Vec<Vec<f64>> {
    let n_atoms = space.n_atoms();
    let mut mass = vec![vec![0.0; n_atoms]; n_atoms];
    for (atom, priority) in priorities.iter().enumerate() {
        for (index, probability) in probabilities.iter().enumerate() {
            if let Some(unit) = space.optimal_unit(priority, index) {
                mass[unit][atom] += probability;
            }
        }
    }
    mass
}

pub fn dispatch_fractions(
    space: &StateSpace,
    steady: &SteadyState,
    arrival_rates: &[f64],
    priorities: &[Vec<usize>],
    capacity: Capacity,
) -> DispatchFractions {
    let n_atoms = space.n_atoms();
    let total_rate: f64 = arrival_rates.iter().sum();
    let mass = optimal_dispatch_mass(space, priorities, &steady.probabilities);

    let mut immediate = vec![vec![0.0; n_atoms]; n_atoms];
    let mut delayed = vec![vec![0.0; n_atoms]; n_atoms];
    match capacity {
        Capacity::Zero => {
            let served = total_rate * (1.0 - steady.all_busy_probability(space));
            for unit in 0..n_atoms {
                for atom in 0..n_atoms {
                    immediate[unit][atom] = arrival_rates[atom] * mass[unit][atom] / served;
                }
            }
        }
        Capacity::Infinite => {
            let per_unit_delay = steady.queue_delay_probability / n_atoms as f64;
            for unit in 0..n_atoms {
                for atom in 0..n_atoms {
                    let share = arrival_rates[atom] / total_rate;
                    immediate[unit][atom] = share * mass[unit][atom];
                    delayed[unit][atom] = share * per_unit_delay;
                }
            }
        }
    }

    DispatchFractions { immediate, delayed }
}

/// Arrival-weighted mean travel time `f' T f` with `f` the normalised rates.
pub fn mean_queued_travel_time(arrival_rates: &[f64], travel_times: &[Vec<f64>]) -> f64 {
    let total_rate: f64 = arrival_rates.iter().sum();
    let mut weighted = 0.0;
    for (from, row) in travel_times.iter().enumerate() {
        for (to, time) in row.iter().enumerate() {
            weighted += arrival_rates[from] / total_rate * time * arrival_rates[to] / total_rate;
        }
    }
    weighted
}

/// Expected travel time per dispatch of each unit.
///
/// Queued calls are served by whichever unit frees up first, from anywhere in
/// the region, so they are charged the arrival-weighted mean travel time. A
/// unit that never receives a dispatch gets zero.
pub fn average_travel_times(
    fractions: &DispatchFractions,
    steady: &SteadyState,
    arrival_rates: &[f64],
    travel_times: &[Vec<f64>],
    capacity: Capacity,
) -> Vec<f64> {
    let n_atoms = travel_times.len();
    let (queued_weight, queued_time) = match capacity {
        Capacity::Zero => (0.0, 0.0),
        Capacity::Infinite => (
            steady.queue_delay_probability / n_atoms as f64,
            mean_queued_travel_time(arrival_rates, travel_times),
        ),
    };

    (0..n_atoms)
        .map(|unit| {
            let row = &fractions.immediate[unit];
            let numerator: f64 = travel_times[unit]
                .iter()
                .zip(row)
                .map(|(time, fraction)| time * fraction)
                .sum::<f64>()
                + queued_time * queued_weight;
            let denominator = row.iter().sum::<f64>() + queued_weight;
            if denominator > 0.0 {
                numerator / denominator
            } else {
                0.0
            }
        })
        .collect()
}
