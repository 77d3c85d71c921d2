//! Augmented derivative evaluation
//!
//! [`DerivativeFunction`] is the single evaluation primitive handed to the
//! numerical integrator. The integrated vector is the 6-component Cartesian
//! state followed by the N×N state-transition matrix flattened row-major,
//! N being the number of active parameters.
//!
//! Each evaluation rebuilds the Jacobian A(t) from scratch: the kinematic
//! identity block (∂ẋ/∂v = I) plus every force model's accumulated partials,
//! then forms the variational equation dΦ/dt = A·Φ. Evaluations are
//! stateless and side-effect free, so the integrator may call them in any
//! order and as often as it needs.

use crate::forces::CompositeForce;
use crate::params::ParameterGroup;
use crate::state::State;
use nalgebra::{DMatrix, DVector};

/// Assembles the augmented derivative vector for the integrator
pub struct DerivativeFunction<'a> {
    forces: &'a CompositeForce,
    params: &'a ParameterGroup,
}

impl<'a> DerivativeFunction<'a> {
    /// Create an evaluator over the given forces and active parameters
    pub fn new(forces: &'a CompositeForce, params: &'a ParameterGroup) -> Self {
        Self { forces, params }
    }

    /// Length of the augmented vector: 6 + N²
    pub fn dim(&self) -> usize {
        let n = self.params.dim();
        6 + n * n
    }

    /// Evaluate the augmented derivative at time `t`
    ///
    /// `y` and `dydt` must both have length [`dim`](Self::dim).
    pub fn eval(&self, _t: f64, y: &DVector<f64>, dydt: &mut DVector<f64>) {
        let n = self.params.dim();
        let (state, phi) = unpack_augmented(y, n);

        let accel = self.forces.total_acceleration(&state);

        let mut a_mat = DMatrix::zeros(n, n);
        for i in 0..3 {
            a_mat[(i, i + 3)] = 1.0;
        }
        self.forces.accumulate_partials(&mut a_mat, &state, self.params);

        let phi_dot = &a_mat * &phi;

        // Position derivatives are the velocity components, velocity
        // derivatives the accumulated acceleration.
        for i in 0..3 {
            dydt[i] = state.velocity[i];
            dydt[3 + i] = accel[i];
        }
        for i in 0..n {
            for j in 0..n {
                dydt[6 + i * n + j] = phi_dot[(i, j)];
            }
        }
    }
}

/// Flatten state and STM into the augmented integration vector (row-major STM)
pub fn pack_augmented(state: &State, stm: &DMatrix<f64>) -> DVector<f64> {
    let n = stm.nrows();
    let mut y = DVector::zeros(6 + n * n);
    for i in 0..3 {
        y[i] = state.position[i];
        y[3 + i] = state.velocity[i];
    }
    for i in 0..n {
        for j in 0..n {
            y[6 + i * n + j] = stm[(i, j)];
        }
    }
    y
}

/// Split an augmented vector back into state and N×N STM
pub fn unpack_augmented(y: &DVector<f64>, n: usize) -> (State, DMatrix<f64>) {
    let state = State::new(
        nalgebra::Vector3::new(y[0], y[1], y[2]),
        nalgebra::Vector3::new(y[3], y[4], y[5]),
    );
    let stm = DMatrix::from_row_slice(n, n, &y.as_slice()[6..]);
    (state, stm)
}
