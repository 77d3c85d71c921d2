//! Numerical integrators for trajectory propagation
//!
//! This module provides a trait-based abstraction for numerical
//! integration over dynamically sized state vectors, so the same stepper
//! drives a bare 6-component state or a state augmented with an N×N
//! state-transition matrix.
//!
//! # Available Integrators
//!
//! - **AdaptiveRk4**: classic Runge-Kutta 4 with step-doubling error
//!   estimation, weighted absolute/relative error control, and Richardson
//!   extrapolation of accepted steps

use nalgebra::DVector;

/// Absolute and relative tolerance for adaptive error control
///
/// A step is accepted when max_i |err_i| / (abs + rel·|y_i|) ≤ 1.
#[derive(Debug, Clone, Copy)]
pub struct Tolerances {
    /// Absolute tolerance per component
    pub abs: f64,

    /// Relative tolerance per component
    pub rel: f64,
}

impl Tolerances {
    /// Create tolerances with uniform values
    pub fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-10,
            rel: 1e-9,
        }
    }
}

/// Result of a single integration step
#[derive(Debug, Clone)]
pub struct StepResult {
    /// New state after the step
    pub y: DVector<f64>,

    /// Actual step size used
    pub dt_used: f64,

    /// Scaled local error estimate (≤ 1 for accepted steps)
    pub error_estimate: Option<f64>,

    /// Whether the step met tolerance
    pub success: bool,
}

/// Trait for numerical integrators
///
/// The derivative callback receives (t, y) and returns dy/dt. It is called
/// strictly sequentially within a step; implementations must not retain
/// state across calls.
pub trait Integrator: Send + Sync {
    /// Take a single fixed step of size `dt`
    fn step(
        &self,
        t: f64,
        y: &DVector<f64>,
        dt: f64,
        deriv: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
    ) -> DVector<f64>;

    /// Take one adaptive step of at most `dt_suggested`, shrinking until
    /// the error estimate meets `tol`
    ///
    /// Returns `success = false` when tolerance cannot be met at the
    /// integrator's minimum step size; the returned state is then
    /// meaningless and must be discarded by the caller.
    fn adaptive_step(
        &self,
        t: f64,
        y: &DVector<f64>,
        dt_suggested: f64,
        tol: &Tolerances,
        deriv: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
    ) -> StepResult;

    /// Integrator name
    fn name(&self) -> &'static str;

    /// Integrator order (for error estimation)
    fn order(&self) -> u8;

    /// Number of function evaluations per fixed step
    fn stages(&self) -> usize;
}

/// Runge-Kutta 4 integrator with adaptive stepping via step doubling
///
/// One full step is compared against two half steps; the scaled difference
/// is the error estimate and the accepted state is the Richardson
/// extrapolation of the two, giving fifth-order local accuracy.
pub struct AdaptiveRk4 {
    /// Minimum allowed step size (seconds)
    pub min_step: f64,

    /// Maximum allowed step size (seconds)
    pub max_step: f64,

    /// Safety factor for step size adjustment
    pub safety: f64,

    /// Maximum step shrink factor per retry
    pub max_shrink: f64,
}

impl Default for AdaptiveRk4 {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveRk4 {
    /// Create with default settings
    pub fn new() -> Self {
        Self {
            min_step: 1e-6,
            max_step: 300.0,
            safety: 0.9,
            max_shrink: 0.2,
        }
    }

    /// Create with custom step limits
    pub fn with_step_limits(min_step: f64, max_step: f64) -> Self {
        Self {
            min_step,
            max_step,
            ..Self::new()
        }
    }

    /// RK4 step
    fn rk4_step(
        &self,
        t: f64,
        y: &DVector<f64>,
        dt: f64,
        deriv: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
    ) -> DVector<f64> {
        let half = dt / 2.0;

        let k1 = deriv(t, y);
        let k2 = deriv(t + half, &(y + &k1 * half));
        let k3 = deriv(t + half, &(y + &k2 * half));
        let k4 = deriv(t + dt, &(y + &k3 * dt));

        y + (&k1 + &k2 * 2.0 + &k3 * 2.0 + k4) * (dt / 6.0)
    }
}

impl Integrator for AdaptiveRk4 {
    fn step(
        &self,
        t: f64,
        y: &DVector<f64>,
        dt: f64,
        deriv: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
    ) -> DVector<f64> {
        self.rk4_step(t, y, dt, deriv)
    }

    fn adaptive_step(
        &self,
        t: f64,
        y: &DVector<f64>,
        dt_suggested: f64,
        tol: &Tolerances,
        deriv: &dyn Fn(f64, &DVector<f64>) -> DVector<f64>,
    ) -> StepResult {
        // Never exceed the request so the caller can land exactly on its
        // target time; shrink from there as needed.
        let mut h = dt_suggested.min(self.max_step);

        loop {
            // One full step against two half steps
            let y_full = self.rk4_step(t, y, h, deriv);
            let y_half = self.rk4_step(t, y, h / 2.0, deriv);
            let y_half2 = self.rk4_step(t + h / 2.0, &y_half, h / 2.0, deriv);

            // Weighted max-norm of the difference between the two solutions
            let mut error: f64 = 0.0;
            for i in 0..y.len() {
                let scale = tol.abs + tol.rel * y_half2[i].abs();
                error = error.max((y_full[i] - y_half2[i]).abs() / scale);
            }

            if error <= 1.0 {
                // Accept, with Richardson extrapolation for the extra order
                let y_new = (y_half2 * 16.0 - y_full) / 15.0;
                return StepResult {
                    y: y_new,
                    dt_used: h,
                    error_estimate: Some(error),
                    success: true,
                };
            }

            if h <= self.min_step {
                log::warn!("step rejected at minimum step size {h} s (scaled error {error:.3e})");
                return StepResult {
                    y: y.clone(),
                    dt_used: 0.0,
                    error_estimate: Some(error),
                    success: false,
                };
            }

            // Shrink toward the optimal step for a 4th-order method
            let factor = (self.safety * error.powf(-0.2)).clamp(self.max_shrink, 1.0);
            h = (h * factor).max(self.min_step);
        }
    }

    fn name(&self) -> &'static str {
        "Adaptive RK4 (step doubling)"
    }

    fn order(&self) -> u8 {
        4
    }

    fn stages(&self) -> usize {
        4
    }
}
