//! Configuration helpers for trajectory propagation
//!
//! [`ScenarioSettings`] is a plain, swappable description of a propagation
//! scenario: which force models to build, which parameters to track, and
//! the integrator configuration. No file I/O happens here; callers load or
//! construct the settings however they like and hand them over.

use crate::forces::{AtmosphericDrag, CentralBodyGravity, CompositeForce};
use crate::params::Parameter;
use crate::state::{EARTH_RADIUS_M, MU_EARTH};
use crate::trajectory::{PropagatorConfig, Trajectory};
use crate::{PropagationError, State};
use std::sync::Arc;

/// Gravity model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GravityChoice {
    /// No central body
    Off,
    /// Two-body gravity only
    PointMass,
    /// Two-body gravity with J2 oblateness
    J2,
}

impl GravityChoice {
    /// Display name for the choice
    pub fn name(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::PointMass => "Point Mass",
            Self::J2 => "J2",
        }
    }

    /// All selectable choices
    pub fn all() -> &'static [GravityChoice] {
        &[GravityChoice::Off, GravityChoice::PointMass, GravityChoice::J2]
    }
}

/// Scenario-level propagation settings
#[derive(Debug, Clone)]
pub struct ScenarioSettings {
    /// Gravity model to register
    pub gravity: GravityChoice,

    /// Whether to register atmospheric drag
    pub drag: bool,

    /// Non-Cartesian parameters to track from the start
    pub tracked: Vec<Parameter>,

    /// Integrator configuration
    pub config: PropagatorConfig,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            gravity: GravityChoice::J2,
            drag: true,
            tracked: vec![Parameter::Mu, Parameter::J2, Parameter::DragTerm],
            config: PropagatorConfig::default(),
        }
    }
}

impl ScenarioSettings {
    /// Build the composite force model these settings describe
    pub fn build_forces(&self) -> CompositeForce {
        let mut forces = CompositeForce::new();
        match self.gravity {
            GravityChoice::Off => {}
            GravityChoice::PointMass => forces.add(Arc::new(CentralBodyGravity::new(
                "Earth",
                EARTH_RADIUS_M,
                MU_EARTH,
                0.0,
            ))),
            GravityChoice::J2 => forces.add(Arc::new(CentralBodyGravity::earth())),
        }
        if self.drag {
            forces.add(Arc::new(AtmosphericDrag::leo_reference()));
        }
        forces
    }

    /// Build a ready-to-propagate trajectory from an initial state
    pub fn build_trajectory(&self, initial: State) -> Result<Trajectory, PropagationError> {
        let mut trajectory = Trajectory::new(initial, self.config.clone());
        for force in self.build_forces().models() {
            trajectory.add_force_model(force.clone());
        }
        trajectory.activate_parameters(&self.tracked)?;
        Ok(trajectory)
    }
}
