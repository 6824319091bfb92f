//! Sparse upward transition rates of the hypercube.
//!
//! A call from atom `k` arriving in state `i` is sent to the first idle unit of
//! `P[k]`, which always responds from its home atom. Every atom therefore adds
//! its arrival rate to exactly one outgoing edge of each non-saturated state.

use serde::Serialize;

use crate::state_space::StateSpace;

/// Upward rates stored as adjacency lists keyed by target state.
///
/// Each state has at most N upward edges, so a linear scan of a list is
/// cheaper than hashing `(i, j)` pairs. The solver only ever pulls mass into
/// a state, so the source-keyed direction is not kept.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRates {
    /// `incoming[j]` holds `(i, rate)` for each upward edge `i -> j`.
    incoming: Vec<Vec<(usize, f64)>>,
}

impl TransitionRates {
    pub fn build(space: &StateSpace, arrival_rates: &[f64], priorities: &[Vec<usize>]) -> Self {
        let n_states = space.len();
        let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_states];

        for (priority, &rate) in priorities.iter().zip(arrival_rates) {
            for from in 0..n_states {
                let Some(to) = space.upward_optimal_neighbor(priority, from) else {
                    continue;
                };
                let edges = &mut incoming[to];
                match edges.iter_mut().find(|(source, _)| *source == from) {
                    Some((_, existing)) => *existing += rate,
                    None => edges.push((from, rate)),
                }
            }
        }

        Self { incoming }
    }

    /// Rate of the upward edge `from -> to`, zero when absent.
    pub fn rate(&self, from: usize, to: usize) -> f64 {
        self.incoming[to]
            .iter()
            .find(|(source, _)| *source == from)
            .map_or(0.0, |(_, rate)| *rate)
    }

    pub fn incoming(&self, to: usize) -> &[(usize, f64)] {
        &self.incoming[to]
    }

    /// Number of stored `(i, j)` edges.
    pub fn edge_count(&self) -> usize {
        self.incoming.iter().map(Vec::len).sum()
    }
}
