use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HypercubeError, HypercubeResult};

/// Default number of Jacobi sweeps.
pub const DEFAULT_MAX_ITER: usize = 10;

/// Default reserved queue length for the infinite-capacity tail.
pub const DEFAULT_QUEUE_LEN: usize = 100;

/// What happens to a call that arrives while every unit is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capacity {
    /// The call is lost (Erlang-loss regime).
    #[default]
    Zero,
    /// The call waits in an unbounded FIFO queue.
    Infinite,
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Zero => write!(f, "zero"),
            Capacity::Infinite => write!(f, "inf"),
        }
    }
}

impl FromStr for Capacity {
    type Err = HypercubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Capacity::Zero),
            "inf" | "infinite" => Ok(Capacity::Infinite),
            other => Err(HypercubeError::InvalidParams {
                field: "capacity".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Order in which the 2^N states are laid out in the probability vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateOrder {
    /// Index equals the busy bitmask.
    #[default]
    Binary,
    /// Reflected unit-step tour: adjacent indices differ in exactly one unit.
    Tour,
}

/// Parameters for the steady-state solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverParams {
    pub capacity: Capacity,
    /// Upper bound on Jacobi sweeps. Without a tolerance every sweep is run.
    pub max_iter: usize,
    /// Reserved queue length; tail probabilities cover `1..q_len` waiting calls.
    pub q_len: usize,
    /// Optional max-abs change between sweeps at which iteration stops early.
    /// None keeps the fixed-iteration behaviour.
    pub tolerance: Option<f64>,
    pub state_order: StateOrder,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            capacity: Capacity::Zero,
            max_iter: DEFAULT_MAX_ITER,
            q_len: DEFAULT_QUEUE_LEN,
            tolerance: None,
            state_order: StateOrder::Binary,
        }
    }
}

impl SolverParams {
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_queue_len(mut self, q_len: usize) -> Self {
        self.q_len = q_len;
        self
    }

    /// Stop sweeping once successive iterates differ by at most `tolerance`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_state_order(mut self, state_order: StateOrder) -> Self {
        self.state_order = state_order;
        self
    }

    pub fn validate(&self) -> HypercubeResult<()> {
        if self.q_len == 0 {
            return Err(HypercubeError::InvalidParams {
                field: "q_len".to_string(),
                value: self.q_len.to_string(),
            });
        }
        if let Some(tolerance) = self.tolerance {
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(HypercubeError::InvalidParams {
                    field: "tolerance".to_string(),
                    value: tolerance.to_string(),
                });
            }
        }
        Ok(())
    }
}
