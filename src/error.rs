//! Error taxonomy shared by the solver, the illumination estimator and the
//! smoothing stage.
//!
//! Every error is fatal to the call that produced it; no partial result is
//! returned. Near-zero Newton slopes are not errors: they are absorbed by
//! [`DERIVATIVE_EPSILON`](crate::solver::DERIVATIVE_EPSILON).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SfsError {
    /// Malformed image (empty, ragged rows, non-finite samples), inconsistent
    /// slant/tilt pair, or invalid solver parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Illumination angle outside its physical range while range checking is on.
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The illumination estimator could not derive a light direction.
    #[error("illumination estimation failed: {0}")]
    EstimationFailed(String),
}

impl SfsError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
