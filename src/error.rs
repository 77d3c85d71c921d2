//! Error types for propagation and history queries.

use crate::params::Parameter;

/// Propagation error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    /// Query for a time that was never recorded as an accepted step
    #[error("no recorded step at t = {t} s")]
    NoSuchSample {
        /// Queried time (seconds past epoch)
        t: f64,
    },

    /// Adaptive integrator could not meet tolerance at the minimum step size
    #[error("integrator failed to meet tolerance at t = {t} s")]
    ToleranceNotMet {
        /// Time at which the step was rejected
        t: f64,
    },

    /// Step budget exhausted before reaching the target time
    #[error("maximum step count ({0}) exceeded")]
    MaxStepsExceeded(usize),

    /// Parameter already present in the active list
    #[error("duplicate parameter {0}")]
    DuplicateParameter(Parameter),

    /// Target time is before the current time (backward propagation not supported)
    #[error("cannot propagate backward from t = {from} s to t = {to} s")]
    BackwardPropagation {
        /// Current trajectory time
        from: f64,
        /// Requested target time
        to: f64,
    },
}
