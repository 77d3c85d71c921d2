//! Cartesian state representation
//!
//! Provides the length-6 state vector used for numerical integration:
//! position (X, Y, Z) and velocity (dX, dY, dZ) in a fixed inertial frame,
//! in meters and meters per second.

use nalgebra::{Vector3, Vector6};

/// Cartesian point-mass state
///
/// Position and velocity are expressed in an Earth-centered inertial frame.
/// Time is not part of the state; the trajectory tracks it separately as
/// seconds past epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    /// Position (meters)
    pub position: Vector3<f64>,

    /// Velocity (m/s)
    pub velocity: Vector3<f64>,
}

impl State {
    /// Create a new state from position and velocity vectors
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self { position, velocity }
    }

    /// Create from the ordered components (X, Y, Z, dX, dY, dZ)
    pub fn from_vector6(v: &Vector6<f64>) -> Self {
        Self {
            position: Vector3::new(v[0], v[1], v[2]),
            velocity: Vector3::new(v[3], v[4], v[5]),
        }
    }

    /// Flatten to the ordered components (X, Y, Z, dX, dY, dZ)
    pub fn to_vector6(&self) -> Vector6<f64> {
        Vector6::new(
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        )
    }

    /// Distance from the frame origin (meters)
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    /// Speed (m/s)
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Specific orbital energy (vis-viva) for a given gravitational parameter, J/kg
    pub fn specific_energy(&self, mu: f64) -> f64 {
        0.5 * self.velocity.norm_squared() - mu / self.radius()
    }
}

// Physical constants (canonical values for the Earth scenario)

/// Earth's gravitational parameter (GM) in m³/s²
pub const MU_EARTH: f64 = 3.986004415e14;

/// Earth's mean equatorial radius in meters
pub const EARTH_RADIUS_M: f64 = 6378136.3;

/// Earth's J2 oblateness coefficient (dimensionless)
pub const EARTH_J2: f64 = 1.082626925638815e-3;

/// Earth's rotation rate in rad/s
pub const OMEGA_EARTH: f64 = 7.29211585530066e-5;
