//! Linear shape-from-shading (Shah's method).
//!
//! Overview
//! - The reflectance map `R(p, q)` of a Lambertian surface under a distant
//!   light is linearised in the height `Z` through backward differences
//!   `p = Z(r, c) − Z(r − 1, c)`, `q = Z(r, c) − Z(r, c − 1)`.
//! - Every sweep runs three whole-field passes in order:
//!   1. residual `f = E − max(0, R(p, q))`,
//!   2. Newton update `Z ← Z − f / (δf/δZ + ε)` using the same `p, q`,
//!   3. re-estimation of `p, q` from the updated `Z`.
//!   All updates of a sweep read the previous sweep's state (Jacobi scheme).
//! - After a fixed number of sweeps `|Z|` is median filtered (21×21 by
//!   default). `p` and `q` are returned as of the last sweep, unsmoothed.
//!
//! Modules
//! - [`params`] – solver configuration and the first-row/column policy.
//! - [`passes`] – pointwise formulas and the per-pixel passes.
//! - `shah` – the [`ShapeFromShading`] driver.
//! - `workspace` – buffers reused across solves.

pub mod params;
pub mod passes;
mod shah;
mod workspace;

pub use params::{BoundaryMode, SolverParams, DEFAULT_INTENSITY_SCALE, DEFAULT_ITERATIONS};
pub use passes::{clamp_reflectance, LightTerms, DERIVATIVE_EPSILON};
pub use shah::ShapeFromShading;
pub use workspace::SolverWorkspace;

use crate::error::SfsError;
use crate::illumination::Illumination;
use crate::image::ImageF64;

/// Output of a solve; all fields share the input's shape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconstruction {
    /// Median-filtered `|Z|`.
    pub height: ImageF64,
    /// Signed height after the last sweep, before smoothing.
    pub raw_height: ImageF64,
    /// Backward difference along rows, last sweep.
    pub p: ImageF64,
    /// Backward difference along columns, last sweep.
    pub q: ImageF64,
}

/// Reconstruct from row-major intensities in `[0, 1]` with default settings
/// and the given sweep count.
///
/// `slant` and `tilt` must be given together; when both are absent they are
/// estimated from the image.
pub fn solve<R: AsRef<[f64]>>(
    rows: &[R],
    slant: Option<f64>,
    tilt: Option<f64>,
    iterations: usize,
) -> Result<Reconstruction, SfsError> {
    let image = ImageF64::from_rows(rows)?;
    let light = Illumination::from_pair(slant, tilt)?;
    ShapeFromShading::new(SolverParams::default().with_iterations(iterations)).solve(&image, light)
}
