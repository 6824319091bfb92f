//! Enumeration of the 2^N busy/idle configurations of N single-unit servers.
//!
//! A state is stored as a bitmask: bit `u` is set when unit `u` is busy. The
//! state space fixes a bijection between masks and positions `0..2^N` so the
//! solver can keep probabilities in a flat vector.

use crate::error::{HypercubeError, HypercubeResult};
use crate::params::StateOrder;

/// Upper bound on atoms per model; 2^20 states is already ~8 MiB per vector.
pub const MAX_ATOMS: usize = 20;

/// Busy/idle bitmask over the units.
pub type StateMask = u32;

/// Indexed enumeration of every state of the hypercube.
#[derive(Debug, Clone)]
pub struct StateSpace {
    n_atoms: usize,
    order: StateOrder,
    /// Position -> mask.
    states: Vec<StateMask>,
    /// Mask -> position.
    positions: Vec<usize>,
    all_busy: usize,
}

impl StateSpace {
    pub fn new(n_atoms: usize, order: StateOrder) -> HypercubeResult<Self> {
        if n_atoms == 0 {
            return Err(HypercubeError::NoAtoms);
        }
        if n_atoms > MAX_ATOMS {
            return Err(HypercubeError::TooManyAtoms {
                n_atoms,
                max: MAX_ATOMS,
            });
        }

        let states = match order {
            StateOrder::Binary => (0..1 << n_atoms).collect(),
            StateOrder::Tour => unit_step_tour(n_atoms),
        };
        let mut positions = vec![0; states.len()];
        for (position, &mask) in states.iter().enumerate() {
            positions[mask as usize] = position;
        }
        let full: StateMask = (1 << n_atoms) - 1;
        let all_busy = positions[full as usize];

        Ok(Self {
            n_atoms,
            order,
            states,
            positions,
            all_busy,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn order(&self) -> StateOrder {
        self.order
    }

    /// Number of states (2^N).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Bitmask of the state at `index`.
    pub fn state(&self, index: usize) -> StateMask {
        self.states[index]
    }

    /// Position of a bitmask in the enumeration.
    pub fn index_of(&self, mask: StateMask) -> usize {
        self.positions[mask as usize]
    }

    /// Number of busy units in the state at `index`.
    pub fn popcount(&self, index: usize) -> usize {
        self.states[index].count_ones() as usize
    }

    pub fn is_busy(&self, index: usize, unit: usize) -> bool {
        self.states[index] & (1 << unit) != 0
    }

    pub fn all_idle_index(&self) -> usize {
        0
    }

    pub fn all_busy_index(&self) -> usize {
        self.all_busy
    }

    /// Whether the state sits on the boundary (all idle or all busy).
    pub fn is_boundary(&self, index: usize) -> bool {
        let busy = self.popcount(index);
        busy == 0 || busy == self.n_atoms
    }

    /// Number of states sharing each popcount, indexed by busy count.
    pub fn popcount_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_atoms + 1];
        for &mask in &self.states {
            sizes[mask.count_ones() as usize] += 1;
        }
        sizes
    }

    /// First idle unit in `priority` for the state at `index`, if any.
    ///
    /// Entries outside `0..n_atoms` name no unit of this space and are skipped.
    pub fn optimal_unit(&self, priority: &[usize], index: usize) -> Option<usize> {
        let mask = self.states[index];
        priority
            .iter()
            .copied()
            .find(|&unit| unit < self.n_atoms && mask & (1 << unit) == 0)
    }

    /// State reached by dispatching the highest-priority idle unit.
    ///
    /// Returns `None` for the all-busy state.
    pub fn upward_optimal_neighbor(&self, priority: &[usize], index: usize) -> Option<usize> {
        self.optimal_unit(priority, index)
            .map(|unit| self.index_of(self.states[index] | (1 << unit)))
    }

    /// States with exactly one fewer busy unit.
    pub fn lower_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let mask = self.states[index];
        (0..self.n_atoms)
            .filter(move |&unit| mask & (1 << unit) != 0)
            .map(move |unit| self.index_of(mask & !(1 << unit)))
    }

    /// States with exactly one more busy unit.
    pub fn upper_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let mask = self.states[index];
        (0..self.n_atoms)
            .filter(move |&unit| mask & (1 << unit) == 0)
            .map(move |unit| self.index_of(mask | (1 << unit)))
    }
}

/// Build the reflected tour: for each new bit `n`, append the existing prefix
/// in reverse order with bit `n` set, so neighbours differ in one unit.
fn unit_step_tour(n_atoms: usize) -> Vec<StateMask> {
    let mut tour: Vec<StateMask> = Vec::with_capacity(1 << n_atoms);
    tour.push(0);
    tour.push(1);
    for bit in 1..n_atoms {
        let reflected: Vec<StateMask> = tour.iter().rev().map(|&mask| mask | (1 << bit)).collect();
        tour.extend(reflected);
    }
    tour
}
