//! Parameter types configuring the solver.
//!
//! Defaults reproduce the classic setup: 200 sweeps over an image scaled to
//! `[0, 255]`, stale-carry gradients on the first row/column and a 21×21
//! symmetric median filter on `|Z|`.

use crate::error::SfsError;
use crate::illumination::RangeCheck;
use crate::smoothing::MedianParams;
use serde::{Deserialize, Serialize};

/// Number of sweeps when the caller does not choose one.
pub const DEFAULT_ITERATIONS: usize = 200;

/// Factor applied to `[0, 1]` intensities before comparing them to the
/// reflectance map.
pub const DEFAULT_INTENSITY_SCALE: f64 = 255.0;

/// How the backward-difference shift treats the first row and column, which
/// have no previous neighbour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// The shifted buffers are never written on the first row/column and keep
    /// their initial zero, so `p = Z` on row 0 and `q = Z` on column 0.
    #[default]
    StaleCarry,
    /// The first row/column shifts onto itself, giving zero gradient there.
    Replicate,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Exact number of sweeps; `0` returns all-zero fields.
    pub iterations: usize,
    /// `E = image × intensity_scale`.
    pub intensity_scale: f64,
    pub boundary: BoundaryMode,
    /// Final rank filter applied to `|Z|`.
    pub smoothing: MedianParams,
    pub range_check: RangeCheck,
    /// Stop early once the mean absolute residual drops to this value.
    /// `None` always runs `iterations` sweeps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            intensity_scale: DEFAULT_INTENSITY_SCALE,
            boundary: BoundaryMode::StaleCarry,
            smoothing: MedianParams::default(),
            range_check: RangeCheck::Reject,
            tolerance: None,
        }
    }
}

impl SolverParams {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_intensity_scale(mut self, scale: f64) -> Self {
        self.intensity_scale = scale;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryMode) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_smoothing(mut self, smoothing: MedianParams) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn with_range_check(mut self, range_check: RangeCheck) -> Self {
        self.range_check = range_check;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), SfsError> {
        if !(self.intensity_scale.is_finite() && self.intensity_scale > 0.0) {
            return Err(SfsError::invalid(format!(
                "intensity_scale must be positive and finite, got {}",
                self.intensity_scale
            )));
        }
        if let Some(tol) = self.tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(SfsError::invalid(format!(
                    "tolerance must be non-negative and finite, got {tol}"
                )));
            }
        }
        self.smoothing.validate()
    }
}
