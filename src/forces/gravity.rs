//! Central-body gravity force model
//!
//! Two-body gravity with a multiplicative per-axis J2 oblateness factor:
//!
//! aᵢ = −μ xᵢ / r³ · fᵢ
//!
//! where f_{x,y} = 1 − 3/2 J2 (R/r)² (5 z²/r² − 1) and
//! f_z = 1 − 3/2 J2 (R/r)² (5 z²/r² − 3).
//!
//! Supplied analytic partials: ∂a/∂(X, Y, Z), ∂a/∂μ, ∂a/∂J2, ∂a/∂R.
//! Velocity partials are identically zero for this velocity-independent
//! force and are not supplied.

use super::{add_accel_column, ForceModel};
use crate::params::{Parameter, ParameterGroup};
use crate::state::{State, EARTH_J2, EARTH_RADIUS_M, MU_EARTH};
use nalgebra::{DMatrix, Matrix3, Vector3};

/// Central-body gravity with J2 oblateness
///
/// Physical constants are set at construction and immutable thereafter.
pub struct CentralBodyGravity {
    body: String,
    radius: f64,
    mu: f64,
    j2: f64,
}

impl CentralBodyGravity {
    /// Create a gravity model for a central body
    pub fn new(body: impl Into<String>, radius: f64, mu: f64, j2: f64) -> Self {
        Self {
            body: body.into(),
            radius,
            mu,
            j2,
        }
    }

    /// Earth gravity with the canonical constants
    pub fn earth() -> Self {
        Self::new("Earth", EARTH_RADIUS_M, MU_EARTH, EARTH_J2)
    }

    /// Name of the central body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Gravitational parameter (m³/s²)
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// The per-axis J2 factors fᵢ and their J2-sensitivities gᵢ = ∂fᵢ/∂J2
    fn j2_factors(&self, position: &Vector3<f64>) -> ([f64; 3], [f64; 3]) {
        let r2 = position.norm_squared();
        let z2 = position.z * position.z;
        let re2 = self.radius * self.radius;

        let mut f = [0.0; 3];
        let mut g = [0.0; 3];
        for i in 0..3 {
            g[i] = -1.5 * re2 / r2 * (5.0 * z2 / r2 - J2_AXIS_CONST[i]);
            f[i] = 1.0 + self.j2 * g[i];
        }
        (f, g)
    }
}

/// Axis constants of the J2 factor: 1 for x and y, 3 for z.
const J2_AXIS_CONST: [f64; 3] = [1.0, 1.0, 3.0];

impl ForceModel for CentralBodyGravity {
    fn accumulate_acceleration(&self, accel: &mut Vector3<f64>, state: &State) {
        let pos = &state.position;
        let r = pos.norm();
        let r3 = r * r * r;
        let (f, _) = self.j2_factors(pos);

        for i in 0..3 {
            accel[i] += -self.mu * pos[i] / r3 * f[i];
        }
    }

    fn accumulate_partials(
        &self,
        jacobian: &mut DMatrix<f64>,
        state: &State,
        params: &ParameterGroup,
    ) {
        let partials = GravityPartials::evaluate(self, state);
        for (col, param) in params.iter() {
            if let Some(dadp) = partials.column_for(param) {
                add_accel_column(jacobian, col, &dadp);
            }
        }
    }

    fn name(&self) -> &'static str {
        "Central Body Gravity"
    }

    fn description(&self) -> &'static str {
        "Two-body gravity with J2 oblateness"
    }
}

/// Every analytic partial this model knows, evaluated once per call
struct GravityPartials {
    d_pos: Matrix3<f64>,
    d_mu: Vector3<f64>,
    d_j2: Vector3<f64>,
    d_radius: Vector3<f64>,
}

impl GravityPartials {
    fn evaluate(model: &CentralBodyGravity, state: &State) -> Self {
        let pos = state.position;
        let r2 = pos.norm_squared();
        let r = r2.sqrt();
        let r3 = r2 * r;
        let r4 = r2 * r2;
        let r5 = r3 * r2;
        let r6 = r4 * r2;
        let z = pos.z;
        let z2 = z * z;
        let re2 = model.radius * model.radius;

        let (f, g) = model.j2_factors(&pos);

        // ∂aᵢ/∂xⱼ with aᵢ = −μ xᵢ fᵢ / r³:
        //   −μ [ δᵢⱼ fᵢ / r³ − 3 xᵢ xⱼ fᵢ / r⁵ + xᵢ (∂fᵢ/∂xⱼ) / r³ ]
        let mut d_pos = Matrix3::zeros();
        for i in 0..3 {
            for j in 0..3 {
                let dz_term = if j == 2 { 10.0 * z / r4 } else { 0.0 };
                let df = -1.5
                    * model.j2
                    * re2
                    * (dz_term - 20.0 * z2 * pos[j] / r6
                        + 2.0 * J2_AXIS_CONST[i] * pos[j] / r4);

                let delta = if i == j { f[i] / r3 } else { 0.0 };
                d_pos[(i, j)] =
                    -model.mu * (delta - 3.0 * pos[i] * pos[j] * f[i] / r5 + pos[i] * df / r3);
            }
        }

        let mut d_mu = Vector3::zeros();
        let mut d_j2 = Vector3::zeros();
        let mut d_radius = Vector3::zeros();
        for i in 0..3 {
            d_mu[i] = -pos[i] * f[i] / r3;
            d_j2[i] = -model.mu * pos[i] * g[i] / r3;
            // ∂fᵢ/∂R = −3 J2 R / r² (5 z²/r² − cᵢ)
            let df_dr =
                -3.0 * model.j2 * model.radius / r2 * (5.0 * z2 / r2 - J2_AXIS_CONST[i]);
            d_radius[i] = -model.mu * pos[i] / r3 * df_dr;
        }

        Self {
            d_pos,
            d_mu,
            d_j2,
            d_radius,
        }
    }

    fn column_for(&self, param: Parameter) -> Option<Vector3<f64>> {
        match param {
            Parameter::X => Some(self.d_pos.column(0).into_owned()),
            Parameter::Y => Some(self.d_pos.column(1).into_owned()),
            Parameter::Z => Some(self.d_pos.column(2).into_owned()),
            Parameter::Mu => Some(self.d_mu),
            Parameter::J2 => Some(self.d_j2),
            Parameter::BodyRadius => Some(self.d_radius),
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

    fn acceleration(model: &CentralBodyGravity, state: &State) -> Vector3<f64> {
        let mut accel = Vector3::zeros();
        model.accumulate_acceleration(&mut accel, state);
        accel
    }

    #[test]
    fn test_equatorial_two_body_magnitude() {
        let gravity = CentralBodyGravity::earth();
        let r = EARTH_RADIUS_M + 400_000.0;
        let state = State::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, 7660.0, 0.0));

        let accel = acceleration(&gravity, &state);

        // Should point toward center; magnitude within the J2 correction of μ/r²
        assert!(accel.x < 0.0);
        assert!(accel.y.abs() < 1e-12);
        let expected = MU_EARTH / (r * r);
        assert!((accel.norm() - expected).abs() / expected < 2e-3);
    }

    #[test]
    fn test_j2_out_of_plane_pull() {
        let gravity = CentralBodyGravity::earth();
        let r = EARTH_RADIUS_M + 400_000.0;
        let state = State::new(
            Vector3::new(r * 0.707, 0.0, r * 0.707),
            Vector3::new(0.0, 7660.0, 0.0),
        );

        let accel = acceleration(&gravity, &state);

        // Still pointing roughly inward
        let r_hat = state.position.normalize();
        assert!(accel.dot(&r_hat) < 0.0);

        // With J2 zeroed the z-axis pull differs from the full model
        let no_j2 = CentralBodyGravity::new("Earth", EARTH_RADIUS_M, MU_EARTH, 0.0);
        let accel_no_j2 = acceleration(&no_j2, &state);
        assert!((accel.z - accel_no_j2.z).abs() > 0.0);
    }

    #[test]
    fn test_position_partials_match_finite_differences() {
        let gravity = CentralBodyGravity::earth();
        let state = test_state();
        let partials = GravityPartials::evaluate(&gravity, &state);

        let h = 0.1; // meters
        for j in 0..3 {
            let mut plus = state;
            plus.position[j] += h;
            let mut minus = state;
            minus.position[j] -= h;

            let diff = (acceleration(&gravity, &plus) - acceleration(&gravity, &minus)) / (2.0 * h);
            for i in 0..3 {
                let analytic = partials.d_pos[(i, j)];
                assert!(
                    (analytic - diff[i]).abs() <= 1e-6 * diff[i].abs().max(1e-12),
                    "d(a{i})/d(x{j}): analytic {analytic:e} vs fd {diff:?}"
                );
            }
        }
    }

    #[test]
    fn test_constant_partials_match_finite_differences() {
        let state = test_state();
        let base = CentralBodyGravity::earth();
        let partials = GravityPartials::evaluate(&base, &state);

        // μ
        let h = MU_EARTH * 1e-7;
        let plus = CentralBodyGravity::new("Earth", EARTH_RADIUS_M, MU_EARTH + h, EARTH_J2);
        let minus = CentralBodyGravity::new("Earth", EARTH_RADIUS_M, MU_EARTH - h, EARTH_J2);
        let fd = (acceleration(&plus, &state) - acceleration(&minus, &state)) / (2.0 * h);
        assert!((partials.d_mu - fd).norm() <= 1e-6 * fd.norm());

        // J2
        let h = EARTH_J2 * 1e-6;
        let plus = CentralBodyGravity::new("Earth", EARTH_RADIUS_M, MU_EARTH, EARTH_J2 + h);
        let minus = CentralBodyGravity::new("Earth", EARTH_RADIUS_M, MU_EARTH, EARTH_J2 - h);
        let fd = (acceleration(&plus, &state) - acceleration(&minus, &state)) / (2.0 * h);
        assert!((partials.d_j2 - fd).norm() <= 1e-6 * fd.norm());

        // R
        let h = EARTH_RADIUS_M * 1e-7;
        let plus = CentralBodyGravity::new("Earth", EARTH_RADIUS_M + h, MU_EARTH, EARTH_J2);
        let minus = CentralBodyGravity::new("Earth", EARTH_RADIUS_M - h, MU_EARTH, EARTH_J2);
        let fd = (acceleration(&plus, &state) - acceleration(&minus, &state)) / (2.0 * h);
        assert!((partials.d_radius - fd).norm() <= 1e-6 * fd.norm());
    }

    #[test]
    fn test_velocity_columns_untouched() {
        let gravity = CentralBodyGravity::earth();
        let params = ParameterGroup::new();
        let mut jacobian = DMatrix::zeros(6, 6);

        gravity.accumulate_partials(&mut jacobian, &test_state(), &params);

        // Velocity-independent force: columns 3..6 stay zero
        for i in 0..6 {
            for j in 3..6 {
                assert_eq!(jacobian[(i, j)], 0.0);
            }
        }
        // Position columns of the acceleration rows are populated
        assert!(jacobian[(3, 0)] != 0.0);
    }

    #[test]
    fn test_untracked_station_contributes_zero() {
        let gravity = CentralBodyGravity::earth();
        let mut params = ParameterGroup::new();
        params
            .activate(&[Parameter::StationX(1), Parameter::Mu])
            .unwrap();
        let n = params.dim();
        let mut jacobian = DMatrix::zeros(n, n);

        gravity.accumulate_partials(&mut jacobian, &test_state(), &params);

        // Station column (index 6) untouched, mu column (index 7) populated
        for i in 0..n {
            assert_eq!(jacobian[(i, 6)], 0.0);
        }
        assert!(jacobian[(3, 7)] != 0.0);
    }
}
