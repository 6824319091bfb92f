//! Steady-state probabilities of the hypercube.
//!
//! Boundary states (all idle, all busy) take their aggregate probability from
//! the M/M/N closed form and keep it. Interior states are relaxed with a
//! point-Jacobi sweep of the balance equations, with every completion
//! happening at unit rate:
//!
//! ```text
//! pi'(j) = (sum_i pi(i) * lam(i, j) + sum_{i above j} pi(i)) / (lam_total + |j|)
//! ```

use serde::Serialize;

use crate::erlang;
use crate::params::{Capacity, SolverParams};
use crate::state_space::StateSpace;
use crate::transition::TransitionRates;

/// How the Jacobi relaxation ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Convergence {
    /// Sweeps actually performed.
    pub iterations: usize,
    /// Max-abs change in the last sweep (0 when there are no interior states).
    pub residual: f64,
    /// `None` in fixed-iteration mode, otherwise whether the tolerance was met.
    pub converged: Option<bool>,
}

/// Solved probabilities for one model.
#[derive(Debug, Clone, Serialize)]
pub struct SteadyState {
    /// Probability of each state, indexed like the state space.
    pub probabilities: Vec<f64>,
    /// `queue_tail[q - 1]` is the probability of exactly `q` waiting calls.
    pub queue_tail: Vec<f64>,
    /// Probability that an arrival is delayed: tail mass plus all-busy mass.
    /// Zero for zero capacity.
    pub queue_delay_probability: f64,
    pub convergence: Convergence,
}

impl SteadyState {
    pub fn all_busy_probability(&self, space: &StateSpace) -> f64 {
        self.probabilities[space.all_busy_index()]
    }

    /// Sum over states and queue tail; close to one for a usable solution.
    pub fn total_probability(&self) -> f64 {
        self.probabilities.iter().sum::<f64>() + self.queue_tail.iter().sum::<f64>()
    }
}

/// Solve the balance equations.
///
/// Assumes `total_arrival_rate < n_atoms` when `params.capacity` is infinite;
/// the model checks this before calling in.
pub fn solve(
    space: &StateSpace,
    transitions: &TransitionRates,
    total_arrival_rate: f64,
    params: &SolverParams,
) -> SteadyState {
    let n_atoms = space.n_atoms();
    let mut probabilities = initial_probabilities(space, total_arrival_rate, params.capacity);

    let interior: Vec<usize> = (0..space.len())
        .filter(|&index| !space.is_boundary(index))
        .collect();

    let mut iterations = 0;
    let mut residual = if interior.is_empty() { 0.0 } else { f64::INFINITY };
    while iterations < params.max_iter && !interior.is_empty() {
        let next = jacobi_sweep(
            space,
            transitions,
            total_arrival_rate,
            &probabilities,
            &interior,
        );
        residual = interior
            .iter()
            .map(|&index| (next[index] - probabilities[index]).abs())
            .fold(0.0, f64::max);
        probabilities = next;
        iterations += 1;

        if matches!(params.tolerance, Some(tolerance) if residual <= tolerance) {
            break;
        }
    }

    let converged = params.tolerance.map(|tolerance| residual <= tolerance);
    if converged == Some(false) {
        tracing::warn!(
            n_atoms,
            iterations,
            residual,
            tolerance = params.tolerance,
            "steady-state iteration budget exhausted before reaching tolerance"
        );
    }

    let (queue_tail, queue_delay_probability) = match params.capacity {
        Capacity::Zero => (Vec::new(), 0.0),
        Capacity::Infinite => {
            let tail: Vec<f64> = (1..params.q_len)
                .map(|waiting| {
                    erlang::queue_length_probability(total_arrival_rate, n_atoms, waiting)
                })
                .collect();
            let delay = tail.iter().sum::<f64>() + probabilities[space.all_busy_index()];
            (tail, delay)
        }
    };

    SteadyState {
        probabilities,
        queue_tail,
        queue_delay_probability,
        convergence: Convergence {
            iterations,
            residual,
            converged,
        },
    }
}

/// Spread the closed-form mass for `b` busy units evenly over the states with
/// popcount `b`.
fn initial_probabilities(
    space: &StateSpace,
    total_arrival_rate: f64,
    capacity: Capacity,
) -> Vec<f64> {
    let by_busy = erlang::busy_count_distribution(total_arrival_rate, space.n_atoms(), capacity);
    let sizes = space.popcount_sizes();
    (0..space.len())
        .map(|index| {
            let busy = space.popcount(index);
            by_busy[busy] / sizes[busy] as f64
        })
        .collect()
}

fn jacobi_sweep(
    space: &StateSpace,
    transitions: &TransitionRates,
    total_arrival_rate: f64,
    current: &[f64],
    interior: &[usize],
) -> Vec<f64> {
    let mut next = current.to_vec();
    for &state in interior {
        let upward: f64 = transitions
            .incoming(state)
            .iter()
            .map(|&(from, rate)| current[from] * rate)
            .sum();
        let downward: f64 = space.upper_neighbors(state).map(|from| current[from]).sum();
        next[state] = (upward + downward) / (total_arrival_rate + space.popcount(state) as f64);
    }
    next
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::params::StateOrder;

    fn symmetric_two(capacity: Capacity) -> (StateSpace, TransitionRates, SolverParams) {
        let space = StateSpace::new(2, StateOrder::Binary).unwrap();
        let transitions = TransitionRates::build(&space, &[1.0, 1.0], &[vec![0, 1], vec![1, 0]]);
        let params = SolverParams::default()
            .with_capacity(capacity)
            .with_max_iter(20);
        (space, transitions, params)
    }

    #[test]
    fn symmetric_two_atoms_is_a_fixed_point() {
        let (space, transitions, params) = symmetric_two(Capacity::Zero);
        let steady = solve(&space, &transitions, 2.0, &params);

        for (got, want) in steady.probabilities.iter().zip([0.2, 0.2, 0.2, 0.4]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert_eq!(steady.convergence.iterations, 20);
        assert!(steady.convergence.residual < 1e-12);
        assert_eq!(steady.convergence.converged, None);
        assert!(steady.queue_tail.is_empty());
        assert_eq!(steady.queue_delay_probability, 0.0);
    }

    #[test]
    fn tolerance_stops_early() {
        let (space, transitions, params) = symmetric_two(Capacity::Zero);
        let steady = solve(&space, &transitions, 2.0, &params.with_tolerance(1e-9));
        assert_eq!(steady.convergence.iterations, 1);
        assert_eq!(steady.convergence.converged, Some(true));
    }

    /// Three atoms sharing one preference list, with a single sweep allowed
    /// against a tolerance that one sweep cannot reach.
    fn one_sweep_three_atoms() -> (StateSpace, TransitionRates, SolverParams) {
        let space = StateSpace::new(3, StateOrder::Binary).unwrap();
        let priorities = vec![vec![0, 1, 2], vec![0, 1, 2], vec![0, 1, 2]];
        let transitions = TransitionRates::build(&space, &[2.0, 0.1, 0.1], &priorities);
        let params = SolverParams::default()
            .with_max_iter(1)
            .with_tolerance(1e-15);
        (space, transitions, params)
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a plain-text subscriber and return everything it logged.
    fn capture_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn exhausted_budget_reports_not_converged() {
        let (space, transitions, params) = one_sweep_three_atoms();
        let steady = solve(&space, &transitions, 2.2, &params);
        assert_eq!(steady.convergence.iterations, 1);
        assert_eq!(steady.convergence.converged, Some(false));
    }

    #[test]
    fn exhausted_budget_logs_a_warning() {
        let (space, transitions, params) = one_sweep_three_atoms();
        let output = capture_logs(|| {
            solve(&space, &transitions, 2.2, &params);
        });

        assert!(output.contains("WARN"));
        assert!(output.contains("iteration budget exhausted before reaching tolerance"));
        assert!(output.contains("n_atoms=3"));
        assert!(output.contains("iterations=1"));
    }

    #[test]
    fn converged_and_fixed_runs_stay_quiet() {
        let (space, transitions, params) = symmetric_two(Capacity::Zero);
        let output = capture_logs(|| {
            solve(&space, &transitions, 2.0, &params);
            solve(&space, &transitions, 2.0, &params.with_tolerance(1e-9));
        });
        assert!(output.is_empty());
    }

    #[test]
    fn zero_sweeps_keep_closed_form_initialisation() {
        let (space, transitions, params) = symmetric_two(Capacity::Zero);
        let steady = solve(&space, &transitions, 2.0, &params.with_max_iter(0));
        assert_eq!(steady.convergence.iterations, 0);
        assert!((steady.total_probability() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn infinite_capacity_tail_is_geometric() {
        let space = StateSpace::new(2, StateOrder::Binary).unwrap();
        let transitions = TransitionRates::build(&space, &[0.5, 0.5], &[vec![0, 1], vec![1, 0]]);
        let params = SolverParams::default()
            .with_capacity(Capacity::Infinite)
            .with_queue_len(5);
        let steady = solve(&space, &transitions, 1.0, &params);

        assert_eq!(steady.queue_tail.len(), 4);
        for pair in steady.queue_tail.windows(2) {
            assert!((pair[1] / pair[0] - 0.5).abs() < 1e-12);
        }
        let expected = steady.queue_tail.iter().sum::<f64>() + steady.all_busy_probability(&space);
        assert!((steady.queue_delay_probability - expected).abs() < 1e-15);
    }
}
