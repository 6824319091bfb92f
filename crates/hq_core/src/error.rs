//! Error types for model construction.

use thiserror::Error;

/// Errors raised while validating inputs or solver parameters.
///
/// All of these are configuration errors: the model refuses to build rather
/// than produce probabilities that do not mean anything.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HypercubeError {
    #[error("model needs at least one atom")]
    NoAtoms,

    #[error("{n_atoms} atoms exceeds the supported maximum of {max}")]
    TooManyAtoms { n_atoms: usize, max: usize },

    #[error("invalid shape for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("priority row for atom {atom} is not a permutation of the units")]
    InvalidPriorityRow { atom: usize },

    #[error("arrival rate for atom {atom} must be finite and non-negative, got {value}")]
    InvalidArrivalRate { atom: usize, value: f64 },

    #[error("travel time from {from} to {to} must be finite and non-negative, got {value}")]
    InvalidTravelTime { from: usize, to: usize, value: f64 },

    #[error("total arrival rate is zero")]
    ZeroArrivalRate,

    #[error(
        "infinite-capacity queue is unstable: total arrival rate {total_arrival_rate} >= {n_atoms} units"
    )]
    UnstableQueue {
        total_arrival_rate: f64,
        n_atoms: usize,
    },

    #[error("invalid solver parameter: {field} = {value}")]
    InvalidParams { field: String, value: String },
}

pub type HypercubeResult<T> = Result<T, HypercubeError>;
