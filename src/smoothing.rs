//! Square-window median (rank) filter used as the final smoothing stage.
//!
//! Each output sample is the median of the `window × window` neighbourhood of
//! the frozen input. Two border policies are available:
//!
//! - [`EdgeMode::Symmetric`] reflects the field about its edges
//!   (`d c b a | a b c d | d c b a`), repeating the reflection when the window
//!   is larger than the field, so every window holds exactly `window²`
//!   samples and the median is the middle one.
//! - [`EdgeMode::Shrink`] clips the window to the field; with `k` samples the
//!   result is the element at sorted index `k / 2` (upper median when `k` is
//!   even).
//!
//! Samples are ordered with `f64::total_cmp`, so non-finite values do not
//! poison the selection.
use crate::error::SfsError;
use crate::image::{ImageF64, ImageView};
use crate::parallel::for_each_row_mut;
use serde::{Deserialize, Serialize};

/// Side length of the smoothing window applied to the height field.
pub const DEFAULT_WINDOW: usize = 21;

/// Border handling for windows that extend past the field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    #[default]
    Symmetric,
    Shrink,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedianParams {
    /// Odd window side length (>= 1).
    pub window: usize,
    pub edge: EdgeMode,
}

impl Default for MedianParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            edge: EdgeMode::Symmetric,
        }
    }
}

impl MedianParams {
    pub fn new(window: usize, edge: EdgeMode) -> Self {
        Self { window, edge }
    }

    pub fn validate(&self) -> Result<(), SfsError> {
        if self.window == 0 || self.window % 2 == 0 {
            return Err(SfsError::invalid(format!(
                "median window must be a positive odd size, got {}",
                self.window
            )));
        }
        Ok(())
    }
}

/// Median-filter `input` with the given window and border policy.
pub fn median_filter(input: &ImageF64, params: &MedianParams) -> Result<ImageF64, SfsError> {
    params.validate()?;
    let (w, h) = (input.w, input.h);
    let mut out = ImageF64::new(w, h);
    if input.is_empty() {
        return Ok(out);
    }
    let radius = (params.window / 2) as isize;
    let edge = params.edge;

    for_each_row_mut(&mut out.data, w, |y, dst| {
        let mut scratch = Vec::with_capacity(params.window * params.window);
        for (x, px) in dst.iter_mut().enumerate() {
            scratch.clear();
            for dy in -radius..=radius {
                let yy = y as isize + dy;
                let sy = match edge {
                    EdgeMode::Symmetric => reflect_index(yy, h),
                    EdgeMode::Shrink if (0..h as isize).contains(&yy) => yy as usize,
                    EdgeMode::Shrink => continue,
                };
                let row = input.row(sy);
                for dx in -radius..=radius {
                    let xx = x as isize + dx;
                    match edge {
                        EdgeMode::Symmetric => scratch.push(row[reflect_index(xx, w)]),
                        EdgeMode::Shrink if (0..w as isize).contains(&xx) => {
                            scratch.push(row[xx as usize])
                        }
                        EdgeMode::Shrink => {}
                    }
                }
            }
            *px = select_median(&mut scratch);
        }
    });
    Ok(out)
}

/// Symmetric half-sample reflection of `i` into `[0, n)`.
#[inline]
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - 1 - m }) as usize
}

#[inline]
fn select_median(samples: &mut [f64]) -> f64 {
    let mid = samples.len() / 2;
    let (_, median, _) = samples.select_nth_unstable_by(mid, f64::total_cmp);
    *median
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(w: usize, h: usize) -> ImageF64 {
        let mut img = ImageF64::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let noise = ((x * 7919 + y * 104729) % 97) as f64 / 97.0 * 0.3;
                img.set(x, y, x as f64 / w as f64 + noise);
            }
        }
        img
    }

    #[test]
    fn reflection_repeats_past_the_field() {
        let idx: Vec<usize> = (-5..9).map(|i| reflect_index(i, 4)).collect();
        assert_eq!(idx, vec![3, 3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0, 0]);
        assert_eq!(reflect_index(-30, 1), 0);
    }

    #[test]
    fn constant_field_is_a_fixed_point() {
        let img = ImageF64::filled(5, 5, 3.25);
        for edge in [EdgeMode::Symmetric, EdgeMode::Shrink] {
            let out = median_filter(&img, &MedianParams::new(DEFAULT_WINDOW, edge)).unwrap();
            assert_eq!(out, img);
        }
    }

    #[test]
    fn isolated_spike_is_removed() {
        let mut img = ImageF64::new(9, 9);
        img.set(4, 4, 100.0);
        let out = median_filter(&img, &MedianParams::new(3, EdgeMode::Symmetric)).unwrap();
        assert!(out.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn window_of_one_is_identity() {
        let img = pattern(6, 4);
        let out = median_filter(&img, &MedianParams::new(1, EdgeMode::Shrink)).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn even_or_zero_window_is_rejected() {
        let img = ImageF64::new(3, 3);
        for window in [0, 2, 20] {
            assert!(matches!(
                median_filter(&img, &MedianParams::new(window, EdgeMode::Symmetric)),
                Err(SfsError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn edge_modes_agree_away_from_the_border() {
        let img = pattern(16, 12);
        let params = MedianParams::new(5, EdgeMode::Symmetric);
        let sym = median_filter(&img, &params).unwrap();
        let shrink_params = MedianParams {
            edge: EdgeMode::Shrink,
            ..params
        };
        let shrink = median_filter(&img, &shrink_params).unwrap();
        for y in 2..10 {
            for x in 2..14 {
                assert_eq!(sym.get(x, y), shrink.get(x, y), "differs at ({x}, {y})");
            }
        }
    }

    #[test]
    fn shrunk_corner_window_takes_upper_median() {
        // The 3x3 window at (0, 0) clips to the 2x2 block {1, 2, 3, 4}.
        let img = ImageF64::from_rows(&[vec![1.0, 2.0, 9.0], vec![3.0, 4.0, 9.0]]).unwrap();
        let out = median_filter(&img, &MedianParams::new(3, EdgeMode::Shrink)).unwrap();
        assert_eq!(out.get(0, 0), 3.0);
    }

    #[test]
    fn second_pass_changes_little() {
        let img = pattern(30, 24);
        let params = MedianParams::new(7, EdgeMode::Symmetric);
        let once = median_filter(&img, &params).unwrap();
        let twice = median_filter(&once, &params).unwrap();

        let mean_change = |a: &ImageF64, b: &ImageF64| {
            let total: f64 = a.data.iter().zip(&b.data).map(|(x, y)| (x - y).abs()).sum();
            total / a.data.len() as f64
        };
        let first = mean_change(&once, &img);
        let second = mean_change(&twice, &once);
        let worst = twice
            .data
            .iter()
            .zip(&once.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(second < 0.25 * first, "first={first:.4} second={second:.4}");
        assert!(worst < 0.1, "worst change {worst:.4}");
    }
}
