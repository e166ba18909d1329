//! Diagnostics data model returned by
//! [`ShapeFromShading::solve_with_diagnostics`](crate::ShapeFromShading::solve_with_diagnostics).
//!
//! `SolveReport` pairs the reconstruction with a serializable `SolveTrace`
//! describing the run: the illumination actually used (and the estimate it
//! came from, if any), the per-sweep mean absolute residual, stage timings and
//! summary statistics of the output fields.

pub mod report;
pub mod timing;

pub use report::{InputDescriptor, SolveReport, SolveTrace};
pub use timing::{StageTiming, TimingBreakdown};
