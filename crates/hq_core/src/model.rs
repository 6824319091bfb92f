//! The solved hypercube queueing model.
//!
//! Construction runs the whole pipeline once: state space, upward transition
//! rates, steady state, dispatch fractions, travel times. The result is
//! immutable.

use serde::Serialize;

use crate::erlang;
use crate::error::{HypercubeError, HypercubeResult};
use crate::inputs::HypercubeInputs;
use crate::metrics::{self, DispatchFractions};
use crate::params::{Capacity, SolverParams};
use crate::solver::{self, Convergence, SteadyState};
use crate::state_space::StateSpace;
use crate::transition::TransitionRates;

/// Default tolerance for [`HypercubeModel::is_valid`].
pub const DEFAULT_VALIDITY_TOLERANCE: f64 = 1e-6;

/// Hypercube queueing model with zero- or infinite-line capacity.
///
/// Two simplifications of the full Larson model apply: each call has a single
/// optimal unit, and an available unit is always at its home atom.
#[derive(Debug, Clone)]
pub struct HypercubeModel {
    inputs: HypercubeInputs,
    params: SolverParams,
    space: StateSpace,
    transitions: TransitionRates,
    steady: SteadyState,
    fractions: DispatchFractions,
    travel_times: Vec<f64>,
}

impl HypercubeModel {
    /// Build and solve a model, checking every input against `n_atoms`.
    pub fn new(
        n_atoms: usize,
        arrival_rates: Vec<f64>,
        travel_times: Vec<Vec<f64>>,
        priorities: Vec<Vec<usize>>,
        params: SolverParams,
    ) -> HypercubeResult<Self> {
        let inputs = HypercubeInputs::new(arrival_rates, travel_times, priorities);
        inputs.validate(n_atoms)?;
        Self::build(inputs, params)
    }

    /// Build and solve a model sized by its arrival-rate vector.
    pub fn solve(inputs: HypercubeInputs, params: SolverParams) -> HypercubeResult<Self> {
        inputs.validate(inputs.n_atoms())?;
        Self::build(inputs, params)
    }

    fn build(inputs: HypercubeInputs, params: SolverParams) -> HypercubeResult<Self> {
        params.validate()?;
        let n_atoms = inputs.n_atoms();
        let total_rate = inputs.total_arrival_rate();
        if params.capacity == Capacity::Infinite && !erlang::is_stable(total_rate, n_atoms) {
            return Err(HypercubeError::UnstableQueue {
                total_arrival_rate: total_rate,
                n_atoms,
            });
        }

        let space = StateSpace::new(n_atoms, params.state_order)?;
        let n_states = space.len();

        tracing::debug!(n_atoms, n_states, "calculating upward transition rates");
        let transitions = TransitionRates::build(&space, &inputs.arrival_rates, &inputs.priorities);

        tracing::debug!(
            n_atoms,
            n_states,
            capacity = %params.capacity,
            max_iter = params.max_iter,
            "calculating steady-state probabilities"
        );
        let steady = solver::solve(&space, &transitions, total_rate, &params);

        tracing::debug!(n_atoms, "calculating dispatch fractions");
        let fractions = metrics::dispatch_fractions(
            &space,
            &steady,
            &inputs.arrival_rates,
            &inputs.priorities,
            params.capacity,
        );

        tracing::debug!(n_atoms, "calculating average travel times");
        let travel_times = metrics::average_travel_times(
            &fractions,
            &steady,
            &inputs.arrival_rates,
            &inputs.travel_times,
            params.capacity,
        );

        Ok(Self {
            inputs,
            params,
            space,
            transitions,
            steady,
            fractions,
            travel_times,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.space.n_atoms()
    }

    pub fn capacity(&self) -> Capacity {
        self.params.capacity
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn inputs(&self) -> &HypercubeInputs {
        &self.inputs
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.space
    }

    pub fn transitions(&self) -> &TransitionRates {
        &self.transitions
    }

    pub fn steady_state(&self) -> &SteadyState {
        &self.steady
    }

    /// Steady-state probability of every state (Π).
    pub fn probabilities(&self) -> &[f64] {
        &self.steady.probabilities
    }

    /// Probabilities of `1..q_len` waiting calls (Π_Q); empty for zero capacity.
    pub fn queue_probabilities(&self) -> &[f64] {
        &self.steady.queue_tail
    }

    /// Probability that an arrival waits (Π_Q'); zero for zero capacity.
    pub fn queue_delay_probability(&self) -> f64 {
        self.steady.queue_delay_probability
    }

    pub fn all_busy_probability(&self) -> f64 {
        self.steady.all_busy_probability(&self.space)
    }

    /// Fraction of calls lost because every unit was busy.
    pub fn blocking_probability(&self) -> f64 {
        match self.params.capacity {
            Capacity::Zero => self.all_busy_probability(),
            Capacity::Infinite => 0.0,
        }
    }

    pub fn convergence(&self) -> Convergence {
        self.steady.convergence
    }

    /// Ρ₁: dispatch fractions without queueing delay, `[unit][atom]`.
    pub fn immediate_dispatch_fractions(&self) -> &[Vec<f64>] {
        &self.fractions.immediate
    }

    /// Ρ₂: dispatch fractions with queueing delay, `[unit][atom]`.
    pub fn delayed_dispatch_fractions(&self) -> &[Vec<f64>] {
        &self.fractions.delayed
    }

    pub fn dispatch_fractions(&self) -> &DispatchFractions {
        &self.fractions
    }

    /// Ρ₁ + Ρ₂.
    pub fn total_dispatch_fractions(&self) -> Vec<Vec<f64>> {
        self.fractions.total()
    }

    /// Share of all dispatches handled by each unit.
    pub fn unit_workload(&self) -> Vec<f64> {
        self.fractions.unit_shares()
    }

    /// Tu: expected travel time per dispatch for each unit.
    pub fn average_travel_times(&self) -> &[f64] {
        &self.travel_times
    }

    /// ΣΠ + ΣΠ_Q.
    pub fn total_probability(&self) -> f64 {
        self.steady.total_probability()
    }

    /// Whether the probabilities sum to one within `tolerance`.
    pub fn is_valid(&self, tolerance: f64) -> bool {
        (self.total_probability() - 1.0).abs() <= tolerance
    }

    /// Expected busy time over a period with `total_calls` dispatches:
    /// each dispatch costs its unit's travel time plus the mean on-scene time.
    pub fn estimated_workload(&self, total_calls: f64, mean_service_time: f64) -> f64 {
        self.total_dispatch_fractions()
            .iter()
            .zip(&self.travel_times)
            .map(|(row, travel)| {
                row.iter().sum::<f64>() * total_calls * (travel + mean_service_time)
            })
            .sum()
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            n_atoms: self.n_atoms(),
            capacity: self.params.capacity,
            total_arrival_rate: self.inputs.total_arrival_rate(),
            total_probability: self.total_probability(),
            all_busy_probability: self.all_busy_probability(),
            queue_delay_probability: self.queue_delay_probability(),
            average_travel_times: self.travel_times.clone(),
            unit_workload: self.unit_workload(),
            convergence: self.convergence(),
        }
    }
}

/// Flat view of a solved model for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub n_atoms: usize,
    pub capacity: Capacity,
    pub total_arrival_rate: f64,
    pub total_probability: f64,
    pub all_busy_probability: f64,
    pub queue_delay_probability: f64,
    pub average_travel_times: Vec<f64>,
    pub unit_workload: Vec<f64>,
    pub convergence: Convergence,
}
