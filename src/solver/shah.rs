use super::params::SolverParams;
use super::passes::{
    gradient_pass, residual_pass, scale_pass, shift_pass, update_pass, LightTerms,
};
use super::workspace::SolverWorkspace;
use super::Reconstruction;
use crate::diagnostics::{InputDescriptor, SolveReport, SolveTrace, TimingBreakdown};
use crate::error::SfsError;
use crate::illumination::{Illumination, IlluminationEstimator, StatisticalEstimator};
use crate::image::ImageF64;
use crate::smoothing::median_filter;
use log::{debug, trace, warn};
use std::time::Instant;

const STAGE_RESIDUAL: &str = "residual";
const STAGE_UPDATE: &str = "update";
const STAGE_GRADIENT: &str = "gradient";
const STAGE_SMOOTHING: &str = "smoothing";

/// Linear shape-from-shading solver.
///
/// Owns its buffers so repeated solves on equally sized images reuse them.
pub struct ShapeFromShading {
    params: SolverParams,
    workspace: SolverWorkspace,
}

impl Default for ShapeFromShading {
    fn default() -> Self {
        Self::new(SolverParams::default())
    }
}

impl ShapeFromShading {
    pub fn new(params: SolverParams) -> Self {
        Self {
            params,
            workspace: SolverWorkspace::new(),
        }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SolverParams) {
        self.params = params;
    }

    /// Buffers left by the most recent solve.
    pub fn workspace(&self) -> &SolverWorkspace {
        &self.workspace
    }

    /// Reconstruct from an image in `[0, 1]`. Without an illumination the
    /// [`StatisticalEstimator`] supplies slant and tilt.
    pub fn solve(
        &mut self,
        image: &ImageF64,
        illumination: Option<Illumination>,
    ) -> Result<Reconstruction, SfsError> {
        self.solve_with_estimator(image, illumination, &StatisticalEstimator)
    }

    /// Like [`solve`](Self::solve) with a caller-chosen estimator.
    pub fn solve_with_estimator(
        &mut self,
        image: &ImageF64,
        illumination: Option<Illumination>,
        estimator: &dyn IlluminationEstimator,
    ) -> Result<Reconstruction, SfsError> {
        self.solve_with_diagnostics(image, illumination, estimator)
            .map(|report| report.reconstruction)
    }

    /// Full solve returning the reconstruction together with a trace of the run.
    pub fn solve_with_diagnostics(
        &mut self,
        image: &ImageF64,
        illumination: Option<Illumination>,
        estimator: &dyn IlluminationEstimator,
    ) -> Result<SolveReport, SfsError> {
        let total_start = Instant::now();
        let params = self.params;
        params.validate()?;
        validate_image(image)?;

        let (light, estimate) = match illumination {
            Some(light) => (light, None),
            None => {
                let est = estimator.estimate(image)?;
                (est.illumination(), Some(est))
            }
        };
        light.validate(params.range_check)?;

        let (w, h) = (image.w, image.h);
        debug!(
            "ShapeFromShading::solve {}x{} slant={:.4} tilt={:.4} iterations={} estimated={}",
            w,
            h,
            light.slant,
            light.tilt,
            params.iterations,
            estimate.is_some()
        );

        let terms = LightTerms::new(&light);
        let mut timings = TimingBreakdown::default();
        let mut residual_trace = Vec::with_capacity(params.iterations.min(4096));
        let mut iterations_run = 0;

        let ws = &mut self.workspace;
        ws.reset(w, h);
        scale_pass(image, params.intensity_scale, &mut ws.e);

        for sweep in 0..params.iterations {
            let start = Instant::now();
            residual_pass(&ws.e, &ws.p, &ws.q, &terms, &mut ws.reflectance, &mut ws.residual);
            let mean_abs = mean_abs(&ws.residual);
            timings.accumulate(STAGE_RESIDUAL, start.elapsed());
            residual_trace.push(mean_abs);
            trace!("sweep {sweep}: mean |f| = {mean_abs:.6e}");

            if let Some(tol) = params.tolerance {
                if mean_abs <= tol {
                    debug!("ShapeFromShading::solve converged after {sweep} sweeps (mean |f| = {mean_abs:.3e} <= {tol:.3e})");
                    break;
                }
            }

            let start = Instant::now();
            update_pass(
                &ws.z,
                &ws.p,
                &ws.q,
                &ws.residual,
                &terms,
                &mut ws.dfdz,
                &mut ws.z_next,
            );
            std::mem::swap(&mut ws.z, &mut ws.z_next);
            timings.accumulate(STAGE_UPDATE, start.elapsed());

            let start = Instant::now();
            shift_pass(&ws.z, params.boundary, &mut ws.zx, &mut ws.zy);
            gradient_pass(&ws.z, &ws.zx, &ws.zy, &mut ws.p, &mut ws.q);
            timings.accumulate(STAGE_GRADIENT, start.elapsed());

            iterations_run += 1;
        }

        let start = Instant::now();
        let height = median_filter(&ws.z.abs(), &params.smoothing)?;
        timings.accumulate(STAGE_SMOOTHING, start.elapsed());

        if !ws.z.all_finite() {
            warn!("ShapeFromShading::solve produced non-finite heights");
        }

        let reconstruction = Reconstruction {
            height,
            raw_height: ws.z.clone(),
            p: ws.p.clone(),
            q: ws.q.clone(),
        };
        timings.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "ShapeFromShading::solve finished {} sweeps in {:.3} ms, final mean |f| = {:?}",
            iterations_run,
            timings.total_ms,
            residual_trace.last()
        );

        let trace = SolveTrace {
            input: InputDescriptor {
                width: w,
                height: h,
                mean_intensity: image.mean(),
            },
            illumination: light,
            light_direction: light.direction(),
            estimate,
            iterations_requested: params.iterations,
            iterations_run,
            residual_trace,
            timings,
            height: reconstruction.height.stats(),
            raw_height: reconstruction.raw_height.stats(),
            p: reconstruction.p.stats(),
            q: reconstruction.q.stats(),
        };
        Ok(SolveReport {
            reconstruction,
            trace,
        })
    }
}

fn validate_image(image: &ImageF64) -> Result<(), SfsError> {
    if image.is_empty() {
        return Err(SfsError::invalid(format!(
            "image must be non-empty, got {}x{}",
            image.w, image.h
        )));
    }
    if image.stride != image.w || image.data.len() != image.w * image.h {
        return Err(SfsError::invalid(format!(
            "image buffer of {} samples does not match {}x{} (stride {})",
            image.data.len(),
            image.w,
            image.h,
            image.stride
        )));
    }
    if !image.all_finite() {
        return Err(SfsError::invalid("image contains non-finite samples"));
    }
    let out_of_unit = image
        .data
        .iter()
        .filter(|v| !(0.0..=1.0).contains(*v))
        .count();
    if out_of_unit > 0 {
        warn!("{out_of_unit} image samples lie outside [0, 1]; intensities are expected to be normalized");
    }
    Ok(())
}

fn mean_abs(field: &ImageF64) -> f64 {
    field.data.iter().map(|v| v.abs()).sum::<f64>() / field.data.len() as f64
}
