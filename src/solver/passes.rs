//! The three per-pixel passes of one sweep, plus the pointwise formulas they
//! evaluate.
//!
//! Each pass reads only buffers frozen for its duration and writes only its
//! own outputs, so every pixel can be computed independently. Within a sweep
//! the passes must run in order: residual, Newton update, gradient
//! re-estimation.
use super::params::BoundaryMode;
use crate::illumination::Illumination;
use crate::image::{ImageF64, ImageView};
use crate::parallel::{for_each_row_mut, for_each_row_pair_mut};

/// Added to `δf/δZ` before dividing so a flat slope never divides by zero.
pub const DERIVATIVE_EPSILON: f64 = f64::EPSILON;

/// Reflected radiance cannot be negative.
#[inline]
pub fn clamp_reflectance(r: f64) -> f64 {
    r.max(0.0)
}

/// Illumination-derived constants shared by every pixel of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightTerms {
    pub cos_slant: f64,
    pub sin_slant: f64,
    pub cos_tilt: f64,
    pub sin_tilt: f64,
    pub ix: f64,
    pub iy: f64,
    /// `sqrt(1 + ix² + iy²)`
    pub i_norm: f64,
}

impl LightTerms {
    pub fn new(light: &Illumination) -> Self {
        let (sin_slant, cos_slant) = light.slant.sin_cos();
        let (sin_tilt, cos_tilt) = light.tilt.sin_cos();
        let ix = light.ix();
        let iy = light.iy();
        Self {
            cos_slant,
            sin_slant,
            cos_tilt,
            sin_tilt,
            ix,
            iy,
            i_norm: (1.0 + ix * ix + iy * iy).sqrt(),
        }
    }
}

/// Unclamped reflectance map
/// `R = (cos σ + p·cos τ·sin σ + q·sin τ·sin σ) / sqrt(1 + p² + q²)`.
#[inline]
pub fn reflectance(p: f64, q: f64, l: &LightTerms) -> f64 {
    let num = l.cos_slant + p * l.cos_tilt * l.sin_slant + q * l.sin_tilt * l.sin_slant;
    num / (1.0 + p * p + q * q).sqrt()
}

/// Newton slope `δf/δZ` of the residual with respect to the height.
#[inline]
pub fn residual_derivative(p: f64, q: f64, l: &LightTerms) -> f64 {
    let pq = 1.0 + p * p + q * q;
    let pq_sqrt = pq.sqrt();
    (p + q) * (l.ix * p + l.iy * q + 1.0) / (pq * pq_sqrt * l.i_norm)
        - (l.ix + l.iy) / (pq_sqrt * l.i_norm)
}

/// `Z − f / (δf/δZ + ε)`
#[inline]
pub fn newton_step(z: f64, f: f64, dfdz: f64) -> f64 {
    z - f / (dfdz + DERIVATIVE_EPSILON)
}

/// Pass 1: clamped reflectance and residual `f = E − R` from the current p, q.
pub(crate) fn residual_pass(
    e: &ImageF64,
    p: &ImageF64,
    q: &ImageF64,
    light: &LightTerms,
    reflect_out: &mut ImageF64,
    residual_out: &mut ImageF64,
) {
    let w = e.w;
    for_each_row_pair_mut(
        &mut reflect_out.data,
        &mut residual_out.data,
        w,
        |y, r_row, f_row| {
            let (e_row, p_row, q_row) = (e.row(y), p.row(y), q.row(y));
            for x in 0..w {
                let r = clamp_reflectance(reflectance(p_row[x], q_row[x], light));
                r_row[x] = r;
                f_row[x] = e_row[x] - r;
            }
        },
    );
}

/// Pass 2: Newton slope and updated height, reading the same p, q as pass 1.
pub(crate) fn update_pass(
    z: &ImageF64,
    p: &ImageF64,
    q: &ImageF64,
    residual: &ImageF64,
    light: &LightTerms,
    dfdz_out: &mut ImageF64,
    z_out: &mut ImageF64,
) {
    let w = z.w;
    for_each_row_pair_mut(&mut dfdz_out.data, &mut z_out.data, w, |y, d_row, z_next| {
        let (z_row, p_row, q_row, f_row) = (z.row(y), p.row(y), q.row(y), residual.row(y));
        for x in 0..w {
            let d = residual_derivative(p_row[x], q_row[x], light);
            d_row[x] = d;
            z_next[x] = newton_step(z_row[x], f_row[x], d);
        }
    });
}

/// Pass 3a: shifted copies `Zx[r] = Z[r − 1]` (row above) and
/// `Zy[.., c] = Z[.., c − 1]` (column to the left).
///
/// The first row of `zx` and the first column of `zy` are left untouched under
/// [`BoundaryMode::StaleCarry`]; under [`BoundaryMode::Replicate`] they copy `Z`.
pub(crate) fn shift_pass(
    z: &ImageF64,
    boundary: BoundaryMode,
    zx: &mut ImageF64,
    zy: &mut ImageF64,
) {
    let w = z.w;
    let replicate = boundary == BoundaryMode::Replicate;
    for_each_row_pair_mut(&mut zx.data, &mut zy.data, w, |y, zx_row, zy_row| {
        let z_row = z.row(y);
        if y >= 1 {
            zx_row.copy_from_slice(z.row(y - 1));
        } else if replicate {
            zx_row.copy_from_slice(z_row);
        }
        zy_row[1..].copy_from_slice(&z_row[..w - 1]);
        if replicate {
            zy_row[0] = z_row[0];
        }
    });
}

/// Pass 3b: `p = Z − Zx`, `q = Z − Zy`.
pub(crate) fn gradient_pass(
    z: &ImageF64,
    zx: &ImageF64,
    zy: &ImageF64,
    p_out: &mut ImageF64,
    q_out: &mut ImageF64,
) {
    let w = z.w;
    for_each_row_pair_mut(&mut p_out.data, &mut q_out.data, w, |y, p_row, q_row| {
        let (z_row, zx_row, zy_row) = (z.row(y), zx.row(y), zy.row(y));
        for x in 0..w {
            p_row[x] = z_row[x] - zx_row[x];
            q_row[x] = z_row[x] - zy_row[x];
        }
    });
}

/// Scale `[0, 1]` intensities into the residual's units.
pub(crate) fn scale_pass(image: &ImageF64, scale: f64, out: &mut ImageF64) {
    let w = image.w;
    for_each_row_mut(&mut out.data, w, |y, dst| {
        for (d, &s) in dst.iter_mut().zip(image.row(y)) {
            *d = s * scale;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

    fn head_on_45() -> LightTerms {
        LightTerms::new(&Illumination::new(FRAC_PI_4, 0.0))
    }

    #[test]
    fn reflectance_of_flat_patch_is_cos_slant() {
        let l = head_on_45();
        assert!((reflectance(0.0, 0.0, &l) - FRAC_1_SQRT_2).abs() < 1e-12);
        // Facing the light along the first axis: n ∝ (1, 0, 1) gives R = 1.
        assert!((reflectance(1.0, 0.0, &l) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_removes_negative_radiance() {
        let l = head_on_45();
        let raw = reflectance(-3.0, 0.0, &l);
        assert!(raw < 0.0);
        assert_eq!(clamp_reflectance(raw), 0.0);
        assert_eq!(clamp_reflectance(0.25), 0.25);
    }

    #[test]
    fn derivative_at_zero_gradient() {
        let l = head_on_45();
        assert!((residual_derivative(0.0, 0.0, &l) + FRAC_1_SQRT_2).abs() < 1e-12);
        let overhead = LightTerms::new(&Illumination::new(0.0, 0.0));
        assert_eq!(residual_derivative(0.0, 0.0, &overhead), 0.0);
    }

    #[test]
    fn newton_step_survives_a_zero_slope() {
        let z = newton_step(0.0, 1.0, 0.0);
        assert!(z.is_finite());
        assert_eq!(z, -1.0 / DERIVATIVE_EPSILON);
        assert_eq!(newton_step(2.0, 0.0, 0.0), 2.0);
    }

    #[test]
    fn stale_carry_leaves_first_row_and_column_alone() {
        let z = ImageF64::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let mut zx = ImageF64::filled(3, 2, -7.0);
        let mut zy = ImageF64::filled(3, 2, -7.0);
        shift_pass(&z, BoundaryMode::StaleCarry, &mut zx, &mut zy);
        assert_eq!(zx.data, vec![-7.0, -7.0, -7.0, 1.0, 2.0, 3.0]);
        assert_eq!(zy.data, vec![-7.0, 1.0, 2.0, -7.0, 4.0, 5.0]);

        shift_pass(&z, BoundaryMode::Replicate, &mut zx, &mut zy);
        assert_eq!(zx.data, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
        assert_eq!(zy.data, vec![1.0, 1.0, 2.0, 4.0, 4.0, 5.0]);
    }

    #[test]
    fn gradients_are_backward_differences() {
        let z = ImageF64::from_rows(&[vec![1.0, 2.0, 4.0], vec![3.0, 7.0, 8.0]]).unwrap();
        let mut zx = ImageF64::new(3, 2);
        let mut zy = ImageF64::new(3, 2);
        shift_pass(&z, BoundaryMode::StaleCarry, &mut zx, &mut zy);
        let mut p = ImageF64::new(3, 2);
        let mut q = ImageF64::new(3, 2);
        gradient_pass(&z, &zx, &zy, &mut p, &mut q);
        assert_eq!(p.data, vec![1.0, 2.0, 4.0, 2.0, 5.0, 4.0]);
        assert_eq!(q.data, vec![1.0, 1.0, 2.0, 3.0, 4.0, 1.0]);
    }
}
