//! Owned single-channel f64 field in row-major layout (stride == width).
//!
//! Used for every per-pixel quantity of the reconstruction: the input
//! intensities, the height field, the gradient fields and the transient
//! reflectance/residual/derivative buffers.
use crate::error::SfsError;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq)]
pub struct ImageF64 {
    /// Field width in pixels (number of columns)
    pub w: usize,
    /// Field height in pixels (number of rows)
    pub h: usize,
    /// Number of f64 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f64>,
}

/// Summary statistics of a field, reported by the diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub variance: f64,
}

impl ImageF64 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    /// Construct a buffer of size `w × h` with every sample set to `value`.
    pub fn filled(w: usize, h: usize, value: f64) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Build from row-major nested rows.
    ///
    /// Fails when there are no rows, the first row is empty, or any row
    /// differs in length from the first.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, SfsError> {
        let first = rows
            .first()
            .ok_or_else(|| SfsError::invalid("image has no rows"))?;
        let w = first.as_ref().len();
        if w == 0 {
            return Err(SfsError::invalid("image rows are empty"));
        }
        let mut data = Vec::with_capacity(w * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != w {
                return Err(SfsError::invalid(format!(
                    "ragged image: row {y} has {} samples, expected {w}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            w,
            h: rows.len(),
            stride: w,
            data,
        })
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.h)
            .map(|y| {
                let start = self.idx(0, y);
                self.data[start..start + self.w].to_vec()
            })
            .collect()
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    /// Get the sample at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the sample at column `x`, row `y`.
    pub fn set(&mut self, x: usize, y: usize, v: f64) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// True when both fields have identical `(h, w)`.
    pub fn same_shape(&self, other: &ImageF64) -> bool {
        self.w == other.w && self.h == other.h
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Apply `f` to every sample, returning a new field of the same shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            w: self.w,
            h: self.h,
            stride: self.stride,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    pub fn stats(&self) -> FieldStats {
        if self.data.is_empty() {
            return FieldStats::default();
        }
        let n = self.data.len() as f64;
        let mean = self.mean();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sq = 0.0;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
            sq += (v - mean) * (v - mean);
        }
        FieldStats {
            min,
            max,
            mean,
            variance: sq / n,
        }
    }
}

impl Default for ImageF64 {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl crate::image::traits::ImageView for ImageF64 {
    type Pixel = f64;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f64] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl crate::image::traits::ImageViewMut for ImageF64 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f64] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}
