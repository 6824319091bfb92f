//! Hypercube queueing model for spatially distributed single-unit servers.
//!
//! Given per-atom arrival rates, a travel-time matrix and a dispatch-priority
//! policy, the model enumerates every busy/idle configuration of the units,
//! solves for the steady-state distribution and derives dispatch fractions
//! and expected travel time per unit.
//!
//! ```no_run
//! use hq_core::{Capacity, HypercubeModel, SolverParams};
//!
//! let model = HypercubeModel::new(
//!     2,
//!     vec![1.0, 1.0],
//!     vec![vec![1.0, 2.0], vec![2.0, 1.0]],
//!     vec![vec![0, 1], vec![1, 0]],
//!     SolverParams::default().with_capacity(Capacity::Zero).with_max_iter(20),
//! )?;
//! println!("all busy: {:.3}", model.all_busy_probability());
//! # Ok::<(), hq_core::HypercubeError>(())
//! ```

pub mod erlang;
pub mod error;
pub mod inputs;
pub mod metrics;
pub mod model;
pub mod params;
pub mod solver;
pub mod state_space;
pub mod transition;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::{HypercubeError, HypercubeResult};
pub use inputs::HypercubeInputs;
pub use model::{HypercubeModel, ModelSummary};
pub use params::{Capacity, SolverParams, StateOrder};
pub use state_space::StateSpace;
