//! Trajectory orchestration
//!
//! A [`Trajectory`] owns the active force models, the tracked-parameter
//! list, the current state / state-transition matrix / time, and the
//! history of accepted integrator steps. It drives the adaptive integrator
//! across each `propagate_to` call and records (time → state + STM) on
//! every accepted step, so downstream consumers can query any step
//! boundary after the fact.

use crate::derivative::{pack_augmented, unpack_augmented, DerivativeFunction};
use crate::error::PropagationError;
use crate::forces::{CompositeForce, ForceModel};
use crate::integrator::{AdaptiveRk4, Integrator, Tolerances};
use crate::params::{Parameter, ParameterGroup};
use crate::state::State;
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// Snap threshold for landing the final step exactly on the target time.
const TIME_SNAP: f64 = 1e-9;

/// Trajectory propagation configuration
#[derive(Debug, Clone)]
pub struct PropagatorConfig {
    /// Nominal (maximum) step size in seconds
    pub step_size: f64,

    /// Error tolerances for adaptive stepping
    pub tolerances: Tolerances,

    /// Maximum number of accepted steps per propagation call
    pub max_steps: usize,
}

impl Default for PropagatorConfig {
    fn default() -> Self {
        Self {
            step_size: 60.0,
            tolerances: Tolerances::default(),
            max_steps: 1_000_000,
        }
    }
}

impl PropagatorConfig {
    /// Quick propagation settings (lower accuracy, faster)
    pub fn fast() -> Self {
        Self {
            step_size: 120.0,
            tolerances: Tolerances::new(1e-8, 1e-6),
            max_steps: 100_000,
        }
    }

    /// High-precision settings
    pub fn high_precision() -> Self {
        Self {
            step_size: 30.0,
            tolerances: Tolerances::new(1e-12, 1e-11),
            max_steps: 10_000_000,
        }
    }
}

/// One accepted integrator step: time, state, and STM at that time
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Time of the accepted step (seconds past epoch)
    pub time: f64,

    /// Cartesian state at that time
    pub state: State,

    /// State-transition matrix at that time
    pub stm: DMatrix<f64>,
}

/// Propagates a point mass and its state-transition matrix
///
/// Construct with an initial state, register force models and tracked
/// parameters, then call [`propagate_to`](Self::propagate_to) repeatedly
/// with increasing target times. Each call continues from the last
/// successful state; it never re-integrates from epoch.
pub struct Trajectory {
    forces: CompositeForce,
    params: ParameterGroup,
    integrator: Box<dyn Integrator>,
    config: PropagatorConfig,
    time: f64,
    state: State,
    stm: DMatrix<f64>,
    history: Vec<HistoryEntry>,
}

impl Trajectory {
    /// Create a trajectory at the given initial state, starting at t = 0
    ///
    /// Uses the default [`AdaptiveRk4`] integrator; tracking starts with
    /// the six Cartesian components and a 6×6 identity STM.
    pub fn new(initial: State, config: PropagatorConfig) -> Self {
        Self::with_integrator(initial, config, Box::new(AdaptiveRk4::new()))
    }

    /// Create a trajectory with a caller-supplied integrator
    pub fn with_integrator(
        initial: State,
        config: PropagatorConfig,
        integrator: Box<dyn Integrator>,
    ) -> Self {
        let params = ParameterGroup::new();
        let stm = params.identity_stm();
        Self {
            forces: CompositeForce::new(),
            params,
            integrator,
            config,
            time: 0.0,
            state: initial,
            stm,
            history: Vec::new(),
        }
    }

    /// Register a force model
    ///
    /// Force models are independent of the tracked-parameter count, so no
    /// re-initialization happens here.
    pub fn add_force_model(&mut self, force: Arc<dyn ForceModel>) {
        self.forces.add(force);
    }

    /// Start tracking additional parameters
    ///
    /// Appends `additions` to the active list and re-initializes the STM to
    /// the identity sized for the new list. This is a one-shot operation to
    /// be called before the propagation that is meant to track the new
    /// parameters; history recorded by earlier propagations is unaffected
    /// and remains queryable.
    pub fn activate_parameters(&mut self, additions: &[Parameter]) -> Result<(), PropagationError> {
        self.params.activate(additions)?;
        self.stm = self.params.identity_stm();
        log::debug!(
            "Tracking {} parameters, STM reset to identity",
            self.params.dim()
        );
        Ok(())
    }

    /// Current trajectory time (seconds past epoch)
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Current Cartesian state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Current state-transition matrix
    pub fn stm(&self) -> &DMatrix<f64> {
        &self.stm
    }

    /// Active parameter group
    pub fn params(&self) -> &ParameterGroup {
        &self.params
    }

    /// Configuration reference
    pub fn config(&self) -> &PropagatorConfig {
        &self.config
    }

    /// Mutable configuration reference
    pub fn config_mut(&mut self) -> &mut PropagatorConfig {
        &mut self.config
    }

    /// Recorded accepted-step history, in time order
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Times of every recorded accepted step
    pub fn history_times(&self) -> Vec<f64> {
        self.history.iter().map(|e| e.time).collect()
    }

    /// Propagate forward to `target` seconds past epoch
    ///
    /// Records every accepted integrator step into history. On failure
    /// nothing is committed: state, STM, time, and history remain exactly
    /// as before the call, so the trajectory is stalled at its last
    /// successful time and may be retried with adjusted tolerances.
    pub fn propagate_to(&mut self, target: f64) -> Result<(), PropagationError> {
        if target < self.time {
            return Err(PropagationError::BackwardPropagation {
                from: self.time,
                to: target,
            });
        }
        if target == self.time {
            return Ok(());
        }

        let deriv_fn = DerivativeFunction::new(&self.forces, &self.params);
        let dim = deriv_fn.dim();
        let deriv = |t: f64, y: &DVector<f64>| {
            let mut dydt = DVector::zeros(dim);
            deriv_fn.eval(t, y, &mut dydt);
            dydt
        };

        let mut t = self.time;
        let mut y = pack_augmented(&self.state, &self.stm);
        let mut pending: Vec<HistoryEntry> = Vec::new();

        // Record the starting point the first time it is integrated away from
        if self.history.last().map(|e| e.time) != Some(t) {
            pending.push(HistoryEntry {
                time: t,
                state: self.state,
                stm: self.stm.clone(),
            });
        }

        let mut steps = 0usize;
        while target - t > 0.0 {
            if steps >= self.config.max_steps {
                return Err(PropagationError::MaxStepsExceeded(self.config.max_steps));
            }

            let dt = (target - t).min(self.config.step_size);
            let result =
                self.integrator
                    .adaptive_step(t, &y, dt, &self.config.tolerances, &deriv);
            if !result.success {
                log::warn!("propagation stalled at t = {t} s");
                return Err(PropagationError::ToleranceNotMet { t });
            }

            t += result.dt_used;
            if (target - t).abs() <= TIME_SNAP {
                t = target;
            }
            y = result.y;

            let (state, stm) = unpack_augmented(&y, self.params.dim());
            pending.push(HistoryEntry { time: t, state, stm });
            steps += 1;
        }

        // Commit only on success
        let (state, stm) = unpack_augmented(&y, self.params.dim());
        self.state = state;
        self.stm = stm;
        self.time = t;
        self.history.extend(pending);
        Ok(())
    }

    fn entry_at(&self, t: f64) -> Result<&HistoryEntry, PropagationError> {
        self.history
            .binary_search_by(|e| e.time.total_cmp(&t))
            .map(|i| &self.history[i])
            .map_err(|_| PropagationError::NoSuchSample { t })
    }

    /// State at a recorded step boundary
    ///
    /// Exact-key lookup: times between accepted steps were never computed
    /// and are reported as [`PropagationError::NoSuchSample`], not
    /// interpolated.
    pub fn state_at(&self, t: f64) -> Result<State, PropagationError> {
        self.entry_at(t).map(|e| e.state)
    }

    /// State-transition matrix at a recorded step boundary
    pub fn state_partials_at(&self, t: f64) -> Result<&DMatrix<f64>, PropagationError> {
        self.entry_at(t).map(|e| &e.stm)
    }
}
