//! Illumination estimation from image statistics.
//!
//! [`StatisticalEstimator`] assumes a Lambertian scene with uniformly
//! distributed surface normals. Under that assumption the first two moments
//! of the max-normalized image determine albedo and slant, and the mean
//! direction of the normalized image gradient gives the tilt:
//!
//! - `γ = sqrt(6π²·μ2 − 48·μ1²)`, `albedo = γ / π`
//! - `slant = acos(4·μ1 / γ)`
//! - `tilt = atan(mean(Ey/|∇E|) / mean(Ex/|∇E|))`, folded into `[0, π)`
//!
//! Gradients use central differences in the interior and one-sided
//! differences on the borders; `Ex` runs along rows, `Ey` along columns.
use crate::error::SfsError;
use crate::image::{ImageF64, ImageView};
use log::debug;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

use super::Illumination;

const GRADIENT_EPSILON: f64 = f64::EPSILON;

/// Output of an illumination estimator. Only slant and tilt drive the solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IlluminationEstimate {
    pub albedo: f64,
    pub mean_intensity: f64,
    pub slant: f64,
    pub tilt: f64,
}

impl IlluminationEstimate {
    pub fn illumination(&self) -> Illumination {
        Illumination::new(self.slant, self.tilt)
    }
}

/// Derives the light direction from an intensity image in [0, 1].
pub trait IlluminationEstimator {
    fn estimate(&self, image: &ImageF64) -> Result<IlluminationEstimate, SfsError>;
}

/// Moment-based estimator for Lambertian scenes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatisticalEstimator;

impl IlluminationEstimator for StatisticalEstimator {
    fn estimate(&self, image: &ImageF64) -> Result<IlluminationEstimate, SfsError> {
        if image.is_empty() {
            return Err(SfsError::EstimationFailed("image is empty".into()));
        }
        let peak = image.max_value();
        if !(peak.is_finite() && peak > 0.0) {
            return Err(SfsError::EstimationFailed(format!(
                "image maximum must be positive and finite, got {peak}"
            )));
        }
        let e = image.map(|v| v / peak);
        let n = (e.w * e.h) as f64;
        let mu1 = e.mean();
        let mu2 = e.data.iter().map(|v| v * v).sum::<f64>() / n;

        let (avg_ex, avg_ey) = mean_gradient_direction(&e);

        let radicand = 6.0 * PI * PI * mu2 - 48.0 * mu1 * mu1;
        if radicand <= 0.0 {
            return Err(SfsError::EstimationFailed(format!(
                "intensity moments are inconsistent with a Lambertian scene (6π²μ2 − 48μ1² = {radicand:.4})"
            )));
        }
        let gamma = radicand.sqrt();
        let albedo = gamma / PI;
        let slant = (4.0 * mu1 / gamma).clamp(-1.0, 1.0).acos();
        let tilt = fold_tilt(avg_ex, avg_ey);

        debug!(
            "StatisticalEstimator: albedo={albedo:.4} mean={mu1:.4} slant={slant:.4} tilt={tilt:.4}"
        );
        Ok(IlluminationEstimate {
            albedo,
            mean_intensity: mu1,
            slant,
            tilt,
        })
    }
}

/// Mean of the per-pixel unit gradient, `(mean Ex/|∇E|, mean Ey/|∇E|)`.
fn mean_gradient_direction(e: &ImageF64) -> (f64, f64) {
    let (w, h) = (e.w, e.h);
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for r in 0..h {
        let row = e.row(r);
        for c in 0..w {
            let ex = axis_difference(r, h, |i| e.get(c, i));
            let ey = axis_difference(c, w, |j| row[j]);
            let norm = (ex * ex + ey * ey).sqrt() + GRADIENT_EPSILON;
            sum_x += ex / norm;
            sum_y += ey / norm;
        }
    }
    let n = (w * h) as f64;
    (sum_x / n, sum_y / n)
}

#[inline]
fn axis_difference(i: usize, len: usize, at: impl Fn(usize) -> f64) -> f64 {
    if len < 2 {
        0.0
    } else if i == 0 {
        at(1) - at(0)
    } else if i == len - 1 {
        at(i) - at(i - 1)
    } else {
        0.5 * (at(i + 1) - at(i - 1))
    }
}

/// `atan(ay / ax)` folded into `[0, π)`.
fn fold_tilt(avg_ex: f64, avg_ey: f64) -> f64 {
    if avg_ex == 0.0 {
        return if avg_ey == 0.0 { 0.0 } else { FRAC_PI_2 };
    }
    let tilt = (avg_ey / avg_ex).atan();
    if tilt < 0.0 {
        tilt + PI
    } else {
        tilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_is_lit_head_on() {
        let img = ImageF64::filled(8, 6, 0.4);
        let est = StatisticalEstimator.estimate(&img).unwrap();
        assert_eq!(est.mean_intensity, 1.0);
        assert_eq!(est.slant, 0.0, "4μ1/γ exceeds 1 and clamps to slant 0");
        assert_eq!(est.tilt, 0.0);
        let expected_albedo = (6.0 * PI * PI - 48.0).sqrt() / PI;
        assert!((est.albedo - expected_albedo).abs() < 1e-12);
    }

    #[test]
    fn black_image_cannot_be_estimated() {
        let img = ImageF64::new(4, 4);
        assert!(matches!(
            StatisticalEstimator.estimate(&img),
            Err(SfsError::EstimationFailed(_))
        ));
    }

    #[test]
    fn tilt_follows_the_brightening_axis() {
        // Brightness increasing down the rows only: gradient along the first axis.
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|r| vec![0.1 + 0.1 * r as f64; 8])
            .collect();
        let img = ImageF64::from_rows(&rows).unwrap();
        let est = StatisticalEstimator.estimate(&img).unwrap();
        assert!(est.tilt.abs() < 1e-9, "tilt={}", est.tilt);

        // Brightness increasing along the columns: tilt of π/2.
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|_| (0..8).map(|c| 0.1 + 0.1 * c as f64).collect())
            .collect();
        let img = ImageF64::from_rows(&rows).unwrap();
        let est = StatisticalEstimator.estimate(&img).unwrap();
        assert!((est.tilt - FRAC_PI_2).abs() < 1e-9, "tilt={}", est.tilt);
        assert!((0.0..=FRAC_PI_2).contains(&est.slant));
    }

    #[test]
    fn fold_tilt_stays_in_half_turn() {
        assert!((fold_tilt(-1.0, 1.0) - 3.0 * PI / 4.0).abs() < 1e-12);
        assert!((fold_tilt(1.0, 1.0) - PI / 4.0).abs() < 1e-12);
        assert_eq!(fold_tilt(0.0, -0.5), FRAC_PI_2);
    }
}
