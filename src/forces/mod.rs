//! Force models for trajectory propagation
//!
//! This module provides composable force models that can be combined to
//! create a complete dynamics model for point-mass propagation, together
//! with the analytic partial derivatives each force contributes to the
//! variational equations.
//!
//! # Architecture
//!
//! Each force model implements the [`ForceModel`] trait, which accumulates
//! the model's acceleration contribution and its partial-derivative
//! contribution at a given state. Accumulation is additive and in place, so
//! several forces sum correctly per derivative evaluation regardless of
//! registration order.
//!
//! Multiple models are combined using [`CompositeForce`].
//!
//! # Available Models
//!
//! - **CentralBodyGravity**: central-body gravity with J2 oblateness
//! - **AtmosphericDrag**: drag through an exponential co-rotating atmosphere

mod drag;
mod gravity;

pub use drag::{AtmosphericDrag, ExponentialAtmosphere};
pub use gravity::CentralBodyGravity;

use crate::params::ParameterGroup;
use crate::state::State;
use nalgebra::{DMatrix, Vector3};
use std::sync::Arc;

/// Trait for force model contributions
///
/// Both methods add this model's contribution in place and never reset the
/// accumulator, so heterogeneous models compose additively. A model
/// contributes partials only for the parameter pairs it recognizes; every
/// other pair receives exactly zero. Absent partials for a model-owned
/// constant mean "not supplied", not "guaranteed zero"; each concrete model
/// documents which partials it supplies.
pub trait ForceModel: Send + Sync {
    /// Add this model's acceleration at the given state, in m/s²
    fn accumulate_acceleration(&self, accel: &mut Vector3<f64>, state: &State);

    /// Add this model's partials of the acceleration into the Jacobian
    ///
    /// `jacobian` is the N×N matrix over the active parameter order, with
    /// entry (i, j) = ∂(dpᵢ/dt)/∂pⱼ. Force models write only the
    /// acceleration rows (3..6); the column for each active parameter the
    /// model recognizes receives the corresponding ∂a/∂p vector.
    fn accumulate_partials(
        &self,
        jacobian: &mut DMatrix<f64>,
        state: &State,
        params: &ParameterGroup,
    );

    /// Force model name for debugging and logging
    fn name(&self) -> &'static str;

    /// Brief description of the model
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Rows of the Jacobian that receive acceleration partials.
pub(crate) const ACCEL_ROW: usize = 3;

/// Add a ∂a/∂p column vector into the acceleration rows of column `col`.
pub(crate) fn add_accel_column(jacobian: &mut DMatrix<f64>, col: usize, dadp: &Vector3<f64>) {
    jacobian[(ACCEL_ROW, col)] += dadp.x;
    jacobian[(ACCEL_ROW + 1, col)] += dadp.y;
    jacobian[(ACCEL_ROW + 2, col)] += dadp.z;
}

/// Composite force model that aggregates multiple force contributions
///
/// This is the primary way to combine force models into a complete dynamics
/// model. Models are stored reference-counted so the same instance can
/// outlive, and be inspected outside of, the trajectory that registers it.
///
/// # Example
///
/// ```ignore
/// let mut forces = CompositeForce::new();
/// forces.add(Arc::new(CentralBodyGravity::earth()));
/// forces.add(Arc::new(AtmosphericDrag::leo_reference()));
///
/// let total_accel = forces.total_acceleration(&state);
/// ```
#[derive(Default, Clone)]
pub struct CompositeForce {
    forces: Vec<Arc<dyn ForceModel>>,
}

impl CompositeForce {
    /// Create an empty composite force model
    pub fn new() -> Self {
        Self { forces: Vec::new() }
    }

    /// Add a force model to the composite
    pub fn add(&mut self, force: Arc<dyn ForceModel>) {
        log::debug!("Adding force model: {}", force.name());
        self.forces.push(force);
    }

    /// Get the number of force models
    pub fn len(&self) -> usize {
        self.forces.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// List all force model names
    pub fn model_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|f| f.name()).collect()
    }

    /// The registered models, in registration order
    pub fn models(&self) -> &[Arc<dyn ForceModel>] {
        &self.forces
    }

    /// Compute total acceleration from all registered forces
    pub fn total_acceleration(&self, state: &State) -> Vector3<f64> {
        let mut accel = Vector3::zeros();
        for f in &self.forces {
            f.accumulate_acceleration(&mut accel, state);
        }
        accel
    }

    /// Accumulate every model's partials into the Jacobian
    pub fn accumulate_partials(
        &self,
        jacobian: &mut DMatrix<f64>,
        state: &State,
        params: &ParameterGroup,
    ) {
        for f in &self.forces {
            f.accumulate_partials(jacobian, state, params);
        }
    }

    /// Compute acceleration with individual contributions for debugging
    pub fn acceleration_breakdown(&self, state: &State) -> Vec<(&'static str, Vector3<f64>)> {
        self.forces
            .iter()
            .map(|f| {
                let mut accel = Vector3::zeros();
                f.accumulate_acceleration(&mut accel, state);
                (f.name(), accel)
            })
            .collect()
    }
}
