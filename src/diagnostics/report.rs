use crate::diagnostics::TimingBreakdown;
use crate::illumination::{Illumination, IlluminationEstimate};
use crate::image::FieldStats;
use crate::solver::Reconstruction;
use nalgebra::Vector3;
use serde::Serialize;

/// Result produced by
/// [`ShapeFromShading::solve_with_diagnostics`](crate::ShapeFromShading::solve_with_diagnostics).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    #[serde(skip)]
    pub reconstruction: Reconstruction,
    pub trace: SolveTrace,
}

/// Serializable account of one solve.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveTrace {
    pub input: InputDescriptor,
    pub illumination: Illumination,
    pub light_direction: Vector3<f64>,
    /// Present when the illumination came from an estimator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<IlluminationEstimate>,
    pub iterations_requested: usize,
    pub iterations_run: usize,
    /// Mean `|E − R|` at the start of each sweep.
    pub residual_trace: Vec<f64>,
    pub timings: TimingBreakdown,
    pub height: FieldStats,
    pub raw_height: FieldStats,
    pub p: FieldStats,
    pub q: FieldStats,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub mean_intensity: f64,
}

impl SolveTrace {
    pub fn final_residual(&self) -> Option<f64> {
        self.residual_trace.last().copied()
    }

    /// True when the solve stopped before the requested sweep count.
    pub fn converged_early(&self) -> bool {
        self.iterations_run < self.iterations_requested
    }
}
