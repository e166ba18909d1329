//! Row-wise dispatch used by every per-pixel pass.
//!
//! With the `parallel` feature rows are handed to rayon; otherwise they are
//! visited in order. Each callback receives the row index and the output row
//! only, so results do not depend on scheduling.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Call `f(y, row)` for every `width`-long row of `out`.
pub(crate) fn for_each_row_mut<F>(out: &mut [f64], width: usize, f: F)
where
    F: Fn(usize, &mut [f64]) + Send + Sync,
{
    if width == 0 {
        return;
    }
    #[cfg(feature = "parallel")]
    {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        out.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    }
}

/// Same as [`for_each_row_mut`] over two equally shaped outputs.
pub(crate) fn for_each_row_pair_mut<F>(a: &mut [f64], b: &mut [f64], width: usize, f: F)
where
    F: Fn(usize, &mut [f64], &mut [f64]) + Send + Sync,
{
    if width == 0 {
        return;
    }
    debug_assert_eq!(a.len(), b.len());
    #[cfg(feature = "parallel")]
    {
        a.par_chunks_mut(width)
            .zip(b.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (ra, rb))| f(y, ra, rb));
    }
    #[cfg(not(feature = "parallel"))]
    {
        a.chunks_mut(width)
            .zip(b.chunks_mut(width))
            .enumerate()
            .for_each(|(y, (ra, rb))| f(y, ra, rb));
    }
}
