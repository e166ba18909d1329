//! Buffers owned by one solver.
//!
//! `z`, `p`, `q` and the shifted copies `zx`, `zy` carry state from one sweep
//! to the next; `reflectance`, `residual` and `dfdz` are overwritten every
//! sweep. `z_next` is the write side of the height double buffer so the
//! Newton update never reads a height it has already replaced.
use crate::image::ImageF64;

#[derive(Clone, Debug, Default)]
pub struct SolverWorkspace {
    /// Scaled intensities `E`.
    pub(crate) e: ImageF64,
    pub(crate) z: ImageF64,
    pub(crate) z_next: ImageF64,
    pub(crate) p: ImageF64,
    pub(crate) q: ImageF64,
    pub(crate) zx: ImageF64,
    pub(crate) zy: ImageF64,
    pub(crate) reflectance: ImageF64,
    pub(crate) residual: ImageF64,
    pub(crate) dfdz: ImageF64,
}

impl SolverWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every buffer, reallocating only when the shape changes.
    pub fn reset(&mut self, w: usize, h: usize) {
        for buf in [
            &mut self.e,
            &mut self.z,
            &mut self.z_next,
            &mut self.p,
            &mut self.q,
            &mut self.zx,
            &mut self.zy,
            &mut self.reflectance,
            &mut self.residual,
            &mut self.dfdz,
        ] {
            if buf.w == w && buf.h == h && buf.stride == w {
                buf.fill(0.0);
            } else {
                *buf = ImageF64::new(w, h);
            }
        }
    }

    /// Current (unsmoothed) height field.
    pub fn height(&self) -> &ImageF64 {
        &self.z
    }

    /// Current gradient estimates.
    pub fn gradients(&self) -> (&ImageF64, &ImageF64) {
        (&self.p, &self.q)
    }

    /// Residual `E − R` from the most recent sweep.
    pub fn residual(&self) -> &ImageF64 {
        &self.residual
    }

    /// Clamped reflectance from the most recent sweep.
    pub fn reflectance(&self) -> &ImageF64 {
        &self.reflectance
    }

    /// Newton slope `δf/δZ` from the most recent update.
    pub fn derivative(&self) -> &ImageF64 {
        &self.dfdz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_state_and_tracks_shape() {
        let mut ws = SolverWorkspace::new();
        ws.reset(4, 3);
        ws.z.set(1, 1, 9.0);
        ws.reset(4, 3);
        assert!(ws.height().data.iter().all(|&v| v == 0.0));
        ws.reset(2, 5);
        let (p, q) = ws.gradients();
        assert_eq!((p.w, p.h), (2, 5));
        assert_eq!(q.data.len(), 10);
    }
}
