//! Atmospheric drag force model
//!
//! Drag through an exponential atmosphere co-rotating with the central body:
//!
//! a = −T · ρ(r) · |w| · w
//!
//! where T is the drag term (½ Cd A/m), ρ(r) = ρ_ref·exp(−(r − r_ref)/H)
//! and w is the velocity relative to the rotating atmosphere:
//!
//! w = (dX + ω Y, dY − ω X, dZ)
//!
//! Supplied analytic partials: all six Cartesian components and the drag
//! term T. Partials with respect to the remaining model-owned constants
//! (ρ_ref, H, ω) are not supplied; those columns receive zero, which
//! downstream consumers must read as "not yet modeled" rather than
//! "guaranteed zero".

use super::{add_accel_column, ForceModel};
use crate::params::{Parameter, ParameterGroup};
use crate::state::{State, OMEGA_EARTH};
use nalgebra::{DMatrix, Matrix3, Vector3};

/// Exponential atmospheric density profile
///
/// ρ(r) = ρ_ref · exp(−(r − r_ref)/H), with r the distance from the frame
/// origin. The reference height is a radius, not an altitude.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialAtmosphere {
    /// Reference radius (meters)
    pub ref_radius: f64,

    /// Density at the reference radius (kg/m³)
    pub ref_density: f64,

    /// Scale height (meters)
    pub scale_height: f64,
}

impl ExponentialAtmosphere {
    /// Create an exponential profile from reference radius, density, and scale height
    pub fn new(ref_radius: f64, ref_density: f64, scale_height: f64) -> Self {
        Self {
            ref_radius,
            ref_density,
            scale_height,
        }
    }

    /// Density at distance `r` from the frame origin (kg/m³)
    pub fn density(&self, r: f64) -> f64 {
        self.ref_density * (-(r - self.ref_radius) / self.scale_height).exp()
    }
}

/// Atmospheric drag force model
pub struct AtmosphericDrag {
    body: String,
    atmosphere: ExponentialAtmosphere,
    rotation: f64,
    drag_term: f64,
}

impl AtmosphericDrag {
    /// Create a drag model for a rotating planetary atmosphere
    ///
    /// `rotation` is the body's angular rate in rad/s and `drag_term` the
    /// combined ½·Cd·A/m coefficient in m²/kg.
    pub fn new(
        body: impl Into<String>,
        atmosphere: ExponentialAtmosphere,
        rotation: f64,
        drag_term: f64,
    ) -> Self {
        Self {
            body: body.into(),
            atmosphere,
            rotation,
            drag_term,
        }
    }

    /// Reference low-Earth-orbit drag configuration
    ///
    /// Exponential profile anchored at 700 km altitude with a 970 kg,
    /// 3 m², Cd = 2.0 spacecraft.
    pub fn leo_reference() -> Self {
        Self::new(
            "Earth",
            ExponentialAtmosphere::new(7078136.3, 3.614e-13, 88667.0),
            OMEGA_EARTH,
            0.5 * 2.0 * (3.0 / 970.0),
        )
    }

    /// Name of the body whose atmosphere this models
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Atmosphere profile
    pub fn atmosphere(&self) -> &ExponentialAtmosphere {
        &self.atmosphere
    }

    /// Velocity relative to the co-rotating atmosphere
    fn relative_wind(&self, state: &State) -> Vector3<f64> {
        Vector3::new(
            state.velocity.x + self.rotation * state.position.y,
            state.velocity.y - self.rotation * state.position.x,
            state.velocity.z,
        )
    }
}

impl ForceModel for AtmosphericDrag {
    fn accumulate_acceleration(&self, accel: &mut Vector3<f64>, state: &State) {
        let rho = self.atmosphere.density(state.radius());
        let w = self.relative_wind(state);

        *accel += -self.drag_term * rho * w.norm() * w;
    }

    fn accumulate_partials(
        &self,
        jacobian: &mut DMatrix<f64>,
        state: &State,
        params: &ParameterGroup,
    ) {
        let partials = DragPartials::evaluate(self, state);
        for (col, param) in params.iter() {
            if let Some(dadp) = partials.column_for(param) {
                add_accel_column(jacobian, col, &dadp);
            }
        }
    }

    fn name(&self) -> &'static str {
        "Atmospheric Drag"
    }

    fn description(&self) -> &'static str {
        "Drag through an exponential co-rotating atmosphere"
    }
}

/// Every analytic partial this model knows, evaluated once per call
struct DragPartials {
    d_pos: Matrix3<f64>,
    d_vel: Matrix3<f64>,
    d_drag_term: Vector3<f64>,
}

impl DragPartials {
    fn evaluate(model: &AtmosphericDrag, state: &State) -> Self {
        let pos = state.position;
        let r = pos.norm();
        let h = model.atmosphere.scale_height;
        let omega = model.rotation;
        let t = model.drag_term;

        let rho = model.atmosphere.density(r);
        let w = model.relative_wind(state);
        let wmag = w.norm();

        // Density gradient: ∂ρ/∂xⱼ = −ρ xⱼ / (r H)
        let drho = -(rho / (r * h)) * pos;

        // Wind-speed gradient over position: ∂|w|/∂x = −ω w_y/|w|,
        // ∂|w|/∂y = ω w_x/|w|, ∂|w|/∂z = 0
        let dwmag = (omega / wmag) * Vector3::new(-w.y, w.x, 0.0);

        // Wind Jacobian over position: ∂w_x/∂y = ω, ∂w_y/∂x = −ω
        #[rustfmt::skip]
        let wind_jac = Matrix3::new(
            0.0,    omega, 0.0,
            -omega, 0.0,   0.0,
            0.0,    0.0,   0.0,
        );

        // ∂aᵢ/∂xⱼ = −T [ (∂ρ/∂xⱼ)|w| wᵢ + ρ (∂|w|/∂xⱼ) wᵢ + ρ |w| ∂wᵢ/∂xⱼ ]
        let d_pos = -t * (wmag * w * drho.transpose() + rho * w * dwmag.transpose()
            + rho * wmag * wind_jac);

        // ∂aᵢ/∂vⱼ = −T ρ ( wᵢ wⱼ/|w| + |w| δᵢⱼ )
        let d_vel = -t * rho * (w * w.transpose() / wmag + wmag * Matrix3::identity());

        let d_drag_term = -rho * wmag * w;

        Self {
            d_pos,
            d_vel,
            d_drag_term,
        }
    }

    fn column_for(&self, param: Parameter) -> Option<Vector3<f64>> {
        match param {
            Parameter::X => Some(self.d_pos.column(0).into_owned()),
            Parameter::Y => Some(self.d_pos.column(1).into_owned()),
            Parameter::Z => Some(self.d_pos.column(2).into_owned()),
            Parameter::Dx => Some(self.d_vel.column(0).into_owned()),
            Parameter::Dy => Some(self.d_vel.column(1).into_owned()),
            Parameter::Dz => Some(self.d_vel.column(2).into_owned()),
            Parameter::DragTerm => Some(self.d_drag_term),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> State {
        State::new(
            Vector3::new(757700.0, 5222607.0, 4851500.0),
            Vector3::new(2213.21, 4678.34, -5371.30),
        )
    }

    fn acceleration(model: &AtmosphericDrag, state: &State) -> Vector3<f64> {
        let mut accel = Vector3::zeros();
        model.accumulate_acceleration(&mut accel, state);
        accel
    }

    #[test]
    fn test_drag_opposes_relative_wind() {
        let drag = AtmosphericDrag::leo_reference();
        let state = test_state();

        let accel = acceleration(&drag, &state);
        let w = drag.relative_wind(&state);

        assert!(accel.norm() > 0.0);
        // Anti-parallel to the relative wind
        assert!(accel.dot(&w) < 0.0);
        assert!((accel.cross(&w)).norm() < 1e-12 * accel.norm() * w.norm());
    }

    #[test]
    fn test_density_falls_off_with_altitude() {
        use approx::assert_relative_eq;

        let atmosphere = ExponentialAtmosphere::new(7078136.3, 3.614e-13, 88667.0);
        assert_relative_eq!(atmosphere.density(7078136.3), 3.614e-13, max_relative = 1e-12);

        // One scale height up: 1/e
        let one_h = atmosphere.density(7078136.3 + 88667.0);
        assert_relative_eq!(one_h, 3.614e-13 * (-1.0f64).exp(), max_relative = 1e-12);
    }

    #[test]
    fn test_cartesian_partials_match_finite_differences() {
        let drag = AtmosphericDrag::leo_reference();
        let state = test_state();
        let partials = DragPartials::evaluate(&drag, &state);

        // Position columns
        let h = 1.0; // meters
        for j in 0..3 {
            let mut plus = state;
            plus.position[j] += h;
            let mut minus = state;
            minus.position[j] -= h;

            let fd = (acceleration(&drag, &plus) - acceleration(&drag, &minus)) / (2.0 * h);
            let analytic = partials.d_pos.column(j);
            assert!(
                (analytic - fd).norm() <= 1e-6 * fd.norm(),
                "d(a)/d(x{j}): {analytic:?} vs {fd:?}"
            );
        }

        // Velocity columns
        let h = 0.1; // m/s
        for j in 0..3 {
            let mut plus = state;
            plus.velocity[j] += h;
            let mut minus = state;
            minus.velocity[j] -= h;

            let fd = (acceleration(&drag, &plus) - acceleration(&drag, &minus)) / (2.0 * h);
            let analytic = partials.d_vel.column(j);
            assert!(
                (analytic - fd).norm() <= 1e-6 * fd.norm(),
                "d(a)/d(v{j}): {analytic:?} vs {fd:?}"
            );
        }
    }

    #[test]
    fn test_drag_term_partial_matches_finite_differences() {
        let state = test_state();
        let atmosphere = ExponentialAtmosphere::new(7078136.3, 3.614e-13, 88667.0);
        let t0 = 0.5 * 2.0 * (3.0 / 970.0);
        let h = t0 * 1e-6;

        let base = AtmosphericDrag::new("Earth", atmosphere, OMEGA_EARTH, t0);
        let plus = AtmosphericDrag::new("Earth", atmosphere, OMEGA_EARTH, t0 + h);
        let minus = AtmosphericDrag::new("Earth", atmosphere, OMEGA_EARTH, t0 - h);

        let partials = DragPartials::evaluate(&base, &state);
        let fd = (acceleration(&plus, &state) - acceleration(&minus, &state)) / (2.0 * h);

        assert!((partials.d_drag_term - fd).norm() <= 1e-6 * fd.norm());
    }

    #[test]
    fn test_velocity_partials_nonzero_in_atmosphere() {
        let drag = AtmosphericDrag::leo_reference();
        let state = test_state();

        let rho = drag.atmosphere.density(state.radius());
        let w = drag.relative_wind(&state);
        assert!(rho > 0.0 && w.norm() > 0.0);

        let partials = DragPartials::evaluate(&drag, &state);
        for j in 0..3 {
            assert!(partials.d_vel[(j, j)] != 0.0);
        }
    }

    #[test]
    fn test_zero_drag_term_zeroes_cartesian_partials() {
        let atmosphere = ExponentialAtmosphere::new(7078136.3, 3.614e-13, 88667.0);
        let drag = AtmosphericDrag::new("Earth", atmosphere, OMEGA_EARTH, 0.0);
        let state = test_state();

        let partials = DragPartials::evaluate(&drag, &state);
        assert_eq!(partials.d_pos, Matrix3::zeros());
        assert_eq!(partials.d_vel, Matrix3::zeros());
        assert_eq!(acceleration(&drag, &state), Vector3::zeros());
    }
}
