//! Synthetic Lambertian test images.
//!
//! Images are in `[0, 1]` and use the solver's axis layout: the first
//! in-plane axis runs down the rows, the second along the columns.
use crate::illumination::Illumination;
use crate::image::ImageF64;
use crate::solver::passes::{clamp_reflectance, reflectance, LightTerms};

/// Uniform image.
pub fn constant(w: usize, h: usize, value: f64) -> ImageF64 {
    ImageF64::filled(w, h, value)
}

/// A sphere centred in a `size × size` image, radius `radius_fraction · size`,
/// shaded as `albedo · max(0, n · L)` on a black background.
pub fn lambertian_sphere(
    size: usize,
    radius_fraction: f64,
    light: &Illumination,
    albedo: f64,
) -> ImageF64 {
    let mut img = ImageF64::new(size, size);
    let radius = (radius_fraction * size as f64).max(f64::MIN_POSITIVE);
    let centre = (size as f64 - 1.0) * 0.5;
    let l = light.direction();
    for r in 0..size {
        let nx = (r as f64 - centre) / radius;
        for c in 0..size {
            let ny = (c as f64 - centre) / radius;
            let d2 = nx * nx + ny * ny;
            if d2 >= 1.0 {
                continue;
            }
            let nz = (1.0 - d2).sqrt();
            let shade = albedo * (nx * l.x + ny * l.y + nz * l.z).max(0.0);
            img.set(c, r, shade.clamp(0.0, 1.0));
        }
    }
    img
}

/// A plane with constant gradient `(p, q)`, shaded with the solver's own
/// clamped reflectance map.
pub fn tilted_plane(w: usize, h: usize, p: f64, q: f64, light: &Illumination) -> ImageF64 {
    let terms = LightTerms::new(light);
    let value = clamp_reflectance(reflectance(p, q, &terms)).min(1.0);
    ImageF64::filled(w, h, value)
}
