//! varprop - trajectory propagation with variational equations
//!
//! Propagates the trajectory of a point mass under a configurable set of
//! force models while simultaneously integrating the variational equations
//! that yield the state-transition matrix (STM): the sensitivity of the
//! state at time t to the initial state and to tracked physical parameters
//! (gravitational parameter, drag term, station coordinates, ...). The STM
//! is the core input for downstream orbit-determination consumers.
//!
//! # Architecture
//!
//! The crate is organized around composable, swappable components:
//!
//! - **ForceModel**: individual force contributions (gravity with J2,
//!   atmospheric drag), each supplying both acceleration and analytic
//!   partial derivatives
//! - **ParameterGroup**: the ordered list of tracked parameters, which
//!   defines the STM index mapping
//! - **DerivativeFunction**: assembles the augmented state+STM derivative
//!   for the integrator, including dΦ/dt = A(t)·Φ(t)
//! - **Integrator**: adaptive numerical integration over dynamically sized
//!   vectors
//! - **Trajectory**: orchestrates propagation and owns the accepted-step
//!   history
//!
//! # Example
//!
//! ```ignore
//! use varprop::*;
//! use std::sync::Arc;
//!
//! let initial = State::new(position, velocity);
//! let mut trajectory = Trajectory::new(initial, PropagatorConfig::default());
//! trajectory.add_force_model(Arc::new(CentralBodyGravity::earth()));
//! trajectory.add_force_model(Arc::new(AtmosphericDrag::leo_reference()));
//! trajectory.activate_parameters(&[Parameter::Mu, Parameter::DragTerm])?;
//!
//! trajectory.propagate_to(600.0)?;
//! let stm = trajectory.state_partials_at(600.0)?;
//! ```

pub mod derivative;
pub mod error;
pub mod forces;
pub mod integrator;
pub mod params;
pub mod settings;
pub mod state;
pub mod trajectory;

pub use derivative::DerivativeFunction;
pub use error::PropagationError;
pub use forces::{
    AtmosphericDrag, CentralBodyGravity, CompositeForce, ExponentialAtmosphere, ForceModel,
};
pub use integrator::{AdaptiveRk4, Integrator, StepResult, Tolerances};
pub use params::{Parameter, ParameterGroup};
pub use settings::{GravityChoice, ScenarioSettings};
pub use state::State;
pub use trajectory::{HistoryEntry, PropagatorConfig, Trajectory};
