#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod illumination;
pub mod image;
pub mod solver;

// Supporting modules for tools, tests and demos.
pub mod config;
pub mod smoothing;
pub mod synthetic;

mod parallel;

// --- High-level re-exports -------------------------------------------------

// Main entry points: solver + results.
pub use crate::solver::{solve, Reconstruction, ShapeFromShading, SolverParams};
pub use crate::error::SfsError;

// Illumination description and the default estimator.
pub use crate::illumination::{Illumination, IlluminationEstimate, StatisticalEstimator};

// Diagnostics returned by the solver.
pub use crate::diagnostics::{SolveReport, SolveTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use shape_from_shading::prelude::*;
///
/// # fn main() -> Result<(), SfsError> {
/// let image = ImageF64::filled(64, 48, 0.5);
/// let mut solver = ShapeFromShading::new(SolverParams::default());
/// let rec = solver.solve(&image, Some(Illumination::new(0.5, 0.0)))?;
/// println!("peak height = {:.3}", rec.height.max_value());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageF64;
    pub use crate::{Illumination, Reconstruction, SfsError, ShapeFromShading, SolverParams};
}
