//! Tracked-parameter bookkeeping
//!
//! A [`ParameterGroup`] names every scalar quantity whose sensitivity is
//! being tracked: the six Cartesian state components first, followed by any
//! physical constants (gravitational parameter, drag term, station
//! coordinates, ...). The order of the list defines the row/column index
//! mapping of the state-transition matrix, so it is significant and
//! append-only.

use crate::error::PropagationError;
use nalgebra::DMatrix;
use std::fmt;

/// A scalar quantity whose sensitivity is tracked
///
/// Force models recognize the parameters they own analytic partials for and
/// contribute zero for every other pair. Station coordinates exist for
/// downstream measurement-model consumers; no force model supplies partials
/// for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    /// Position X component (meters)
    X,
    /// Position Y component (meters)
    Y,
    /// Position Z component (meters)
    Z,
    /// Velocity X component (m/s)
    Dx,
    /// Velocity Y component (m/s)
    Dy,
    /// Velocity Z component (m/s)
    Dz,
    /// Central-body gravitational parameter (m³/s²)
    Mu,
    /// Central-body J2 oblateness coefficient
    J2,
    /// Central-body equatorial radius (meters)
    BodyRadius,
    /// Drag term ½·Cd·A/m (m²/kg)
    DragTerm,
    /// Ground-station X coordinate, by station index
    StationX(u8),
    /// Ground-station Y coordinate, by station index
    StationY(u8),
    /// Ground-station Z coordinate, by station index
    StationZ(u8),
}

impl Parameter {
    /// The six Cartesian components, in state-vector order
    pub const CARTESIAN: [Parameter; 6] = [
        Parameter::X,
        Parameter::Y,
        Parameter::Z,
        Parameter::Dx,
        Parameter::Dy,
        Parameter::Dz,
    ];

    /// Whether this is one of the six Cartesian state components
    pub fn is_cartesian(&self) -> bool {
        matches!(
            self,
            Parameter::X
                | Parameter::Y
                | Parameter::Z
                | Parameter::Dx
                | Parameter::Dy
                | Parameter::Dz
        )
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::X => write!(f, "X"),
            Parameter::Y => write!(f, "Y"),
            Parameter::Z => write!(f, "Z"),
            Parameter::Dx => write!(f, "dX"),
            Parameter::Dy => write!(f, "dY"),
            Parameter::Dz => write!(f, "dZ"),
            Parameter::Mu => write!(f, "mu"),
            Parameter::J2 => write!(f, "J2"),
            Parameter::BodyRadius => write!(f, "R"),
            Parameter::DragTerm => write!(f, "Cd"),
            Parameter::StationX(i) => write!(f, "X_{i}"),
            Parameter::StationY(i) => write!(f, "Y_{i}"),
            Parameter::StationZ(i) => write!(f, "Z_{i}"),
        }
    }
}

/// Ordered, de-duplicated list of active parameters
///
/// Always begins with the six Cartesian components. The list length N sizes
/// the N×N state-transition matrix; index positions in this list are the
/// row/column indices of that matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterGroup {
    params: Vec<Parameter>,
}

impl Default for ParameterGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterGroup {
    /// Create a group tracking only the Cartesian state
    pub fn new() -> Self {
        Self {
            params: Parameter::CARTESIAN.to_vec(),
        }
    }

    /// Append parameters to the active list
    ///
    /// Duplicates, against either the existing list or within `additions`,
    /// are a caller contract violation and reported as an error with the
    /// list unchanged.
    pub fn activate(&mut self, additions: &[Parameter]) -> Result<(), PropagationError> {
        for (i, p) in additions.iter().enumerate() {
            if self.params.contains(p) || additions[..i].contains(p) {
                return Err(PropagationError::DuplicateParameter(*p));
            }
        }
        self.params.extend_from_slice(additions);
        Ok(())
    }

    /// Number of tracked parameters (the STM dimension N)
    pub fn dim(&self) -> usize {
        self.params.len()
    }

    /// The ordered parameter list
    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    /// Index of a parameter in the active list, if tracked
    pub fn index_of(&self, param: Parameter) -> Option<usize> {
        self.params.iter().position(|p| *p == param)
    }

    /// Iterate over (index, parameter) pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, Parameter)> + '_ {
        self.params.iter().copied().enumerate()
    }

    /// The N×N identity matrix this group's STM starts from
    ///
    /// At the epoch where tracking begins, dx(t0)/dx(t0) = I.
    pub fn identity_stm(&self) -> DMatrix<f64> {
        DMatrix::identity(self.dim(), self.dim())
    }
}
